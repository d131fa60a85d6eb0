#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use embedded_hal_mock::eh1::i2c::Transaction as I2cTransaction;
use heapless::String;
use vl53l0x::{
    BusOperation, DeviceInfo, DeviceMode, FixPoint1616, GpioFunctionality, InterruptPolarity, LimitCheck,
    RangingApi, RangingMeasurementData, RefCalibration, RefSpads, VcselPeriod, Vl53l0xI2C,
};

#[derive(Debug, Clone, PartialEq)]
pub enum FakeError<E> {
    Bus(E),
    Injected(&'static str),
}

impl<E> From<E> for FakeError<E> {
    fn from(e: E) -> Self {
        FakeError::Bus(e)
    }
}

/// Scripted ranging core: records every call by its ST API name and fails on demand.
pub struct FakeApi<B> {
    pub bus: B,
    pub calls: Vec<&'static str>,
    pub fail_on: Option<&'static str>,
    pub mode: Option<DeviceMode>,
    pub limit_values: [FixPoint1616; 2],
    pub limit_enabled: [bool; 2],
    pub timing_budget_us: Option<u32>,
    pub vcsel_periods: [Option<u8>; 2],
    pub gpio_config: Option<(u8, DeviceMode, GpioFunctionality, InterruptPolarity)>,
    pub thresholds: Option<(u32, u32)>,
    pub next_measurement: RangingMeasurementData,
}

impl<B> FakeApi<B> {
    pub fn new(bus: B) -> Self {
        FakeApi {
            bus,
            calls: Vec::new(),
            fail_on: None,
            mode: None,
            limit_values: [FixPoint1616::ZERO; 2],
            limit_enabled: [false; 2],
            timing_budget_us: None,
            vcsel_periods: [None; 2],
            gpio_config: None,
            thresholds: None,
            next_measurement: measurement_mm(0),
        }
    }

    pub fn failing_on(mut self, call: &'static str) -> Self {
        self.fail_on = Some(call);
        self
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl<B: BusOperation> FakeApi<B> {
    fn hit(&mut self, call: &'static str) -> Result<(), FakeError<B::Error>> {
        self.calls.push(call);
        if self.fail_on == Some(call) {
            Err(FakeError::Injected(call))
        } else {
            Ok(())
        }
    }
}

impl<B: BusOperation> RangingApi for FakeApi<B> {
    type Bus = B;
    type Error = FakeError<B::Error>;

    fn bus(&mut self) -> &mut B {
        &mut self.bus
    }

    fn data_init(&mut self) -> Result<(), Self::Error> {
        self.hit("VL53L0X_DataInit")
    }

    fn static_init(&mut self) -> Result<(), Self::Error> {
        self.hit("VL53L0X_StaticInit")
    }

    fn set_device_mode(&mut self, mode: DeviceMode) -> Result<(), Self::Error> {
        self.hit("VL53L0X_SetDeviceMode")?;
        self.mode = Some(mode);
        Ok(())
    }

    fn get_device_mode(&mut self) -> Result<DeviceMode, Self::Error> {
        self.hit("VL53L0X_GetDeviceMode")?;
        Ok(self.mode.unwrap_or(DeviceMode::SingleRanging))
    }

    fn set_limit_check_value(&mut self, check: LimitCheck, value: FixPoint1616) -> Result<(), Self::Error> {
        self.hit("VL53L0X_SetLimitCheckValue")?;
        self.limit_values[check as usize] = value;
        Ok(())
    }

    fn get_limit_check_value(&mut self, check: LimitCheck) -> Result<FixPoint1616, Self::Error> {
        self.hit("VL53L0X_GetLimitCheckValue")?;
        Ok(self.limit_values[check as usize])
    }

    fn set_limit_check_enable(&mut self, check: LimitCheck, enable: bool) -> Result<(), Self::Error> {
        self.hit("VL53L0X_SetLimitCheckEnable")?;
        self.limit_enabled[check as usize] = enable;
        Ok(())
    }

    fn get_limit_check_enable(&mut self, check: LimitCheck) -> Result<bool, Self::Error> {
        self.hit("VL53L0X_GetLimitCheckEnable")?;
        Ok(self.limit_enabled[check as usize])
    }

    fn set_measurement_timing_budget_us(&mut self, budget_us: u32) -> Result<(), Self::Error> {
        self.hit("VL53L0X_SetMeasurementTimingBudgetMicroSeconds")?;
        self.timing_budget_us = Some(budget_us);
        Ok(())
    }

    fn set_vcsel_pulse_period(&mut self, period: VcselPeriod, pclks: u8) -> Result<(), Self::Error> {
        self.hit("VL53L0X_SetVcselPulsePeriod")?;
        self.vcsel_periods[period as usize] = Some(pclks);
        Ok(())
    }

    fn perform_ref_calibration(&mut self) -> Result<RefCalibration, Self::Error> {
        self.hit("VL53L0X_PerformRefCalibration")?;
        Ok(RefCalibration { vhv_settings: 0x1C, phase_cal: 0x02 })
    }

    fn perform_ref_spad_management(&mut self) -> Result<RefSpads, Self::Error> {
        self.hit("VL53L0X_PerformRefSpadManagement")?;
        Ok(RefSpads { count: 5, is_aperture: true })
    }

    fn get_device_info(&mut self) -> Result<DeviceInfo, Self::Error> {
        self.hit("VL53L0X_GetDeviceInfo")?;
        Ok(DeviceInfo {
            name: hstr("VL53L0X ES1 or later"),
            device_type: hstr("VL53L0X"),
            product_id: hstr("VL53L0CBV0DH/1$1"),
            product_type: 1,
            product_revision_major: 1,
            product_revision_minor: 1,
        })
    }

    fn start_measurement(&mut self) -> Result<(), Self::Error> {
        self.hit("VL53L0X_StartMeasurement")
    }

    fn get_ranging_measurement_data(&mut self) -> Result<RangingMeasurementData, Self::Error> {
        self.hit("VL53L0X_GetRangingMeasurementData")?;
        Ok(self.next_measurement)
    }

    fn perform_single_ranging_measurement(&mut self) -> Result<RangingMeasurementData, Self::Error> {
        self.hit("VL53L0X_PerformSingleRangingMeasurement")?;
        Ok(self.next_measurement)
    }

    fn clear_interrupt_mask(&mut self, _mask: u32) -> Result<(), Self::Error> {
        self.hit("VL53L0X_ClearInterruptMask")
    }

    fn set_gpio_config(
        &mut self,
        pin: u8,
        mode: DeviceMode,
        functionality: GpioFunctionality,
        polarity: InterruptPolarity,
    ) -> Result<(), Self::Error> {
        self.hit("VL53L0X_SetGpioConfig")?;
        self.gpio_config = Some((pin, mode, functionality, polarity));
        Ok(())
    }

    fn set_interrupt_thresholds(&mut self, _mode: DeviceMode, low_mm: u32, high_mm: u32) -> Result<(), Self::Error> {
        self.hit("VL53L0X_SetInterruptThresholds")?;
        self.thresholds = Some((low_mm, high_mm));
        Ok(())
    }
}

fn hstr(s: &str) -> String<32> {
    let mut out = String::new();
    out.push_str(s).unwrap();
    out
}

pub fn measurement_mm(range_mm: u16) -> RangingMeasurementData {
    RangingMeasurementData {
        range_millimeter: range_mm,
        range_fractional_part: 0x80,
        ..RangingMeasurementData::default()
    }
}

pub fn fake_api<P: I2c>(i2c: P) -> FakeApi<Vl53l0xI2C<P>> {
    FakeApi::new(Vl53l0xI2C::new(i2c))
}

/// Identification register read returning `id`.
pub fn who_am_i(address: u8, id: u16) -> I2cTransaction {
    I2cTransaction::write_read(address, vec![0xC0], id.to_be_bytes().to_vec())
}

/// Address change command sent at 0x29.
pub fn set_address(new_address: u8) -> I2cTransaction {
    I2cTransaction::write(0x29, vec![0x8A, new_address])
}

/// Delay provider recording every wait in milliseconds.
#[derive(Clone, Default)]
pub struct RecordingDelay {
    pub waits_ms: Rc<RefCell<Vec<u32>>>,
}

impl RecordingDelay {
    pub fn waits(&self) -> Vec<u32> {
        self.waits_ms.borrow().clone()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.borrow_mut().push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.borrow_mut().push(ms);
    }
}

/// Input pin whose every read fails.
pub struct FailingPin;

impl embedded_hal::digital::ErrorType for FailingPin {
    type Error = embedded_hal::digital::ErrorKind;
}

impl embedded_hal::digital::InputPin for FailingPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Err(embedded_hal::digital::ErrorKind::Other)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Err(embedded_hal::digital::ErrorKind::Other)
    }
}

/// Ranging core calls of a successful bring-up, in order.
pub fn bring_up_calls(interrupt: bool, long_range: bool) -> Vec<&'static str> {
    let mut calls = vec![
        "VL53L0X_GetDeviceInfo",
        "VL53L0X_DataInit",
        "VL53L0X_StaticInit",
        "VL53L0X_PerformRefCalibration",
        "VL53L0X_PerformRefSpadManagement",
        "VL53L0X_SetDeviceMode",
        "VL53L0X_GetDeviceMode",
    ];
    if interrupt {
        calls.extend(["VL53L0X_SetGpioConfig", "VL53L0X_SetInterruptThresholds"]);
    }
    calls.extend([
        "VL53L0X_SetLimitCheckValue",
        "VL53L0X_SetLimitCheckValue",
        "VL53L0X_SetMeasurementTimingBudgetMicroSeconds",
        "VL53L0X_SetLimitCheckEnable",
        "VL53L0X_SetLimitCheckEnable",
    ]);
    if long_range {
        calls.extend(["VL53L0X_SetVcselPulsePeriod", "VL53L0X_SetVcselPulsePeriod"]);
    }
    calls.push("VL53L0X_StartMeasurement");
    calls
}
