use crate::consts::{VL53L0X_INTERRUPT_MASK_ALL, VL53L0X_RANGE_NO_DATA_MM};
use crate::{DelayNs, Error, InputPin, OutputPin, RangingApi, Vl53l0x};
use embedded_hal::digital::Error as _;

/// Output channels of the sensor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Every channel; only meaningful for `fetch`.
    All,
    /// Distance in meters.
    Distance,
    /// 1 when the target is within the proximity threshold.
    Proximity,
}

/// Integer and micro parts of a channel value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorValue {
    pub val1: i32,
    pub val2: i32,
}

impl SensorValue {
    /// Whole meters and remaining micrometers.
    pub fn from_distance_mm(range_mm: u16) -> Self {
        let range_mm = range_mm as i32;
        SensorValue {
            val1: range_mm / 1000,
            val2: (range_mm % 1000) * 1000,
        }
    }

    pub fn from_proximity(range_mm: u16, threshold_mm: u32) -> Self {
        SensorValue {
            val1: if range_mm as u32 <= threshold_mm { 1 } else { 0 },
            val2: 0,
        }
    }

    pub fn to_f32(self) -> f32 {
        self.val1 as f32 + self.val2 as f32 / 1_000_000.0
    }
}

impl<A: RangingApi, XST: OutputPin, GP: InputPin, T: DelayNs> Vl53l0x<A, XST, GP, T> {
    /// Fetches a new sample, running the bring-up sequence first if the sensor is not started.
    ///
    /// With `gpio_in_range`, GPIO1 is checked first. The sensor asserts it while a target is
    /// within the proximity threshold (low by default, see `Config::gpio_active_low`).
    /// When it is not asserted no bus transaction happens and the sample is set to 9999 mm,
    /// meaning no target in range.
    pub fn fetch(&mut self, channel: Channel) -> Result<(), Error<A::Error>> {
        let name = self.config.name;
        trace!("[{}] Fetching {:?}", name, channel);

        if !self.is_started() {
            self.start()?;
        }

        if self.config.gpio_in_range && !self.ready_line_asserted()? {
            self.data.measurement.range_millimeter = VL53L0X_RANGE_NO_DATA_MM;
            self.data.measurement.range_fractional_part = 0;
            return Ok(());
        }

        let result = if self.config.continuous_range {
            self.api.get_ranging_measurement_data()
        } else {
            self.api.perform_single_ranging_measurement()
        };

        if self.config.gpio_in_range {
            if self.api.clear_interrupt_mask(VL53L0X_INTERRUPT_MASK_ALL).is_err() {
                error!("[{}] VL53L0X_ClearInterruptMask failed", name);
            }
        }

        match result {
            Ok(measurement) => {
                self.data.measurement = measurement;
                Ok(())
            }
            Err(e) => {
                error!("[{}] Could not perform measurement", name);
                Err(Error::Bus(e))
            }
        }
    }

    /// Converts the last fetched sample.
    ///
    /// # Return
    ///
    /// * `Distance` : meters in `val1`, micrometers in `val2`.
    /// * `Proximity` : 1 in `val1` when the range is at or below the proximity threshold.
    /// * `All` : `Error::NotSupported`.
    pub fn read(&self, channel: Channel) -> Result<SensorValue, Error<A::Error>> {
        let range_mm = self.data.measurement.range_millimeter;
        match channel {
            Channel::Distance => Ok(SensorValue::from_distance_mm(range_mm)),
            Channel::Proximity => Ok(SensorValue::from_proximity(range_mm, self.config.proximity_threshold_mm)),
            Channel::All => Err(Error::NotSupported),
        }
    }

    fn ready_line_asserted(&mut self) -> Result<bool, Error<A::Error>> {
        let active_low = self.config.gpio_active_low;
        let pin = match self.gpio1_pin.as_mut() {
            Some(pin) => pin,
            None => return Err(Error::InvalidConfig),
        };
        let level = if active_low { pin.is_low() } else { pin.is_high() };
        level.map_err(|e| {
            error!("[{}] gpio_pin_get failed", self.config.name);
            Error::Gpio(e.kind())
        })
    }
}
