//! Ranging core capability.
//!
//! The register-level ranging algorithm of the VL53L0X (timing budget math, SPAD
//! selection, sequence steps...) lives in the vendor API. The driver only sequences
//! calls into it, so the vendor port is plugged in through [`RangingApi`].
//!
//! Platform helpers (byte/word access and the address change command) are provided
//! on top of [`BusOperation`], the rest is implemented by the port.

use fixed::types::U16F16;
use heapless::String;

use crate::bus_operation::BusOperation;
use crate::consts::VL53L0X_REG_I2C_SLAVE_DEVICE_ADDRESS;
use embedded_hal::i2c::SevenBitAddress;

/// Fixed point 16.16 value, as used by the limit checks.
pub type FixPoint1616 = U16F16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceMode {
    SingleRanging = 0,
    ContinuousRanging = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LimitCheck {
    SigmaFinalRange = 0,
    SignalRateFinalRange = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VcselPeriod {
    PreRange = 0,
    FinalRange = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioFunctionality {
    Off = 0,
    ThresholdCrossedLow = 1,
    ThresholdCrossedHigh = 2,
    ThresholdCrossedOut = 3,
    NewMeasureReady = 4,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptPolarity {
    Low = 0,
    High = 1,
}

/// Result of the VHV and phase reference calibration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefCalibration {
    pub vhv_settings: u8,
    pub phase_cal: u8,
}

/// Result of the reference SPAD management.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefSpads {
    pub count: u32,
    pub is_aperture: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String<32>,
    pub device_type: String<32>,
    pub product_id: String<32>,
    pub product_type: u8,
    pub product_revision_major: u8,
    pub product_revision_minor: u8,
}

/// Packed ranging results
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RangingMeasurementData {
    // Measured distance in mm
    pub range_millimeter: u16,
    // Sub-millimeter part of the distance, in 1/256 mm
    pub range_fractional_part: u8,
    // 0 when the range is valid
    pub range_status: u8,
    pub signal_rate_rtn_mcps: FixPoint1616,
    pub ambient_rate_rtn_mcps: FixPoint1616,
    pub effective_spad_rtn_count: u16,
    pub measurement_time_us: u32,
}

impl RangingMeasurementData {
    pub fn is_valid(&self) -> bool {
        self.range_status == 0
    }
}

/// Operations of the vendor ranging core the driver depends on.
///
/// Every method runs synchronously on the caller's thread and reports failures
/// through [`RangingApi::Error`]. Bus errors of the transport convert into it.
pub trait RangingApi {
    type Bus: BusOperation;
    type Error: From<<Self::Bus as BusOperation>::Error>;

    /// Transport used by the platform helpers.
    fn bus(&mut self) -> &mut Self::Bus;

    fn data_init(&mut self) -> Result<(), Self::Error>;
    fn static_init(&mut self) -> Result<(), Self::Error>;

    fn set_device_mode(&mut self, mode: DeviceMode) -> Result<(), Self::Error>;
    fn get_device_mode(&mut self) -> Result<DeviceMode, Self::Error>;

    fn set_limit_check_value(&mut self, check: LimitCheck, value: FixPoint1616) -> Result<(), Self::Error>;
    fn get_limit_check_value(&mut self, check: LimitCheck) -> Result<FixPoint1616, Self::Error>;
    fn set_limit_check_enable(&mut self, check: LimitCheck, enable: bool) -> Result<(), Self::Error>;
    fn get_limit_check_enable(&mut self, check: LimitCheck) -> Result<bool, Self::Error>;

    fn set_measurement_timing_budget_us(&mut self, budget_us: u32) -> Result<(), Self::Error>;
    fn set_vcsel_pulse_period(&mut self, period: VcselPeriod, pclks: u8) -> Result<(), Self::Error>;

    fn perform_ref_calibration(&mut self) -> Result<RefCalibration, Self::Error>;
    fn perform_ref_spad_management(&mut self) -> Result<RefSpads, Self::Error>;

    fn get_device_info(&mut self) -> Result<DeviceInfo, Self::Error>;

    fn start_measurement(&mut self) -> Result<(), Self::Error>;
    fn get_ranging_measurement_data(&mut self) -> Result<RangingMeasurementData, Self::Error>;
    fn perform_single_ranging_measurement(&mut self) -> Result<RangingMeasurementData, Self::Error>;
    fn clear_interrupt_mask(&mut self, mask: u32) -> Result<(), Self::Error>;

    fn set_gpio_config(
        &mut self,
        pin: u8,
        mode: DeviceMode,
        functionality: GpioFunctionality,
        polarity: InterruptPolarity,
    ) -> Result<(), Self::Error>;
    fn set_interrupt_thresholds(&mut self, mode: DeviceMode, low_mm: u32, high_mm: u32) -> Result<(), Self::Error>;

    fn read_byte(&mut self, index: u8) -> Result<u8, Self::Error> {
        let mut rbuf: [u8; 1] = [0];
        self.bus().write_read(&[index], &mut rbuf)?;
        Ok(rbuf[0])
    }

    /// Words are big-endian on this sensor.
    fn read_word(&mut self, index: u8) -> Result<u16, Self::Error> {
        let mut rbuf: [u8; 2] = [0; 2];
        self.bus().write_read(&[index], &mut rbuf)?;
        Ok(u16::from_be_bytes(rbuf))
    }

    fn write_byte(&mut self, index: u8, val: u8) -> Result<(), Self::Error> {
        self.bus().write(&[index, val])?;
        Ok(())
    }

    fn write_word(&mut self, index: u8, val: u16) -> Result<(), Self::Error> {
        let [msb, lsb] = val.to_be_bytes();
        self.bus().write(&[index, msb, lsb])?;
        Ok(())
    }

    /// Sends the new address to the sensor at its current address, then points
    /// the transport at the new one.
    fn set_device_address(&mut self, address: SevenBitAddress) -> Result<(), Self::Error> {
        self.write_byte(VL53L0X_REG_I2C_SLAVE_DEVICE_ADDRESS, address & 0x7F)?;
        self.bus().set_address(address);
        Ok(())
    }
}
