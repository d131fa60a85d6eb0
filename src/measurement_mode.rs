use crate::consts::{VL53L0X_GPIO_PIN, VL53L0X_INTERRUPT_THRESHOLD_HIGH_MM};
use crate::{
    BringUpState, DelayNs, DeviceMode, Error, GpioFunctionality, InputPin, InterruptPolarity, OutputPin,
    RangeProfile, RangingApi, Vl53l0x,
};

impl<A: RangingApi, XST: OutputPin, GP: InputPin, T: DelayNs> Vl53l0x<A, XST, GP, T> {
    /// Selects the ranging mode, arms the proximity interrupt when gating is requested,
    /// applies the range profile and starts measuring.
    ///
    /// # Arguments
    ///
    /// * `mode` : single shot or continuous ranging.
    /// * `interrupt` : drive GPIO1 low when the target gets below `threshold_mm`.
    /// * `threshold_mm` : low interrupt threshold.
    /// * `profile` : range profile to apply before starting.
    pub(crate) fn configure_mode(
        &mut self,
        mode: DeviceMode,
        interrupt: bool,
        threshold_mm: u32,
        profile: RangeProfile,
    ) -> Result<(), Error<A::Error>> {
        let name = self.config.name;

        self.api
            .set_device_mode(mode)
            .map_err(|e| self.api_failed("VL53L0X_SetDeviceMode", e))?;
        let mode = self
            .api
            .get_device_mode()
            .map_err(|e| self.api_failed("VL53L0X_GetDeviceMode", e))?;
        self.data.mode = Some(mode);
        debug!("[{}] Device mode {:?}", name, mode);

        if interrupt {
            if self.gpio1_pin.is_none() {
                error!("[{}] No or improper gpio1 specified in config", name);
                return Err(Error::InvalidConfig);
            }

            self.api
                .set_gpio_config(
                    VL53L0X_GPIO_PIN,
                    mode,
                    GpioFunctionality::ThresholdCrossedLow,
                    InterruptPolarity::Low,
                )
                .map_err(|e| self.api_failed("VL53L0X_SetGpioConfig", e))?;
            self.api
                .set_interrupt_thresholds(mode, threshold_mm, VL53L0X_INTERRUPT_THRESHOLD_HIGH_MM)
                .map_err(|e| self.api_failed("VL53L0X_SetInterruptThresholds", e))?;
        }

        self.apply_profile(profile)?;
        self.data.bring_up = BringUpState::ModeConfigured;

        self.api
            .start_measurement()
            .map_err(|e| self.api_failed("VL53L0X_StartMeasurement", e))?;

        Ok(())
    }
}
