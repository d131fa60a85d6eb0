use crate::{BringUpState, DelayNs, Error, FixPoint1616, InputPin, OutputPin, RangingApi, Vl53l0x};

impl<A: RangingApi, XST: OutputPin, GP: InputPin, T: DelayNs> Vl53l0x<A, XST, GP, T> {
    /// Device initialization (data init then static init), followed by the basic
    /// calibration. Runs on every bring-up, results are not kept across power cycles.
    pub(crate) fn calibrate(&mut self) -> Result<(), Error<A::Error>> {
        self.device_initialization()?;
        self.perform_basic_calibration()
    }

    pub(crate) fn device_initialization(&mut self) -> Result<(), Error<A::Error>> {
        self.api.data_init().map_err(|e| self.api_failed("VL53L0X_DataInit", e))?;
        self.api.static_init().map_err(|e| self.api_failed("VL53L0X_StaticInit", e))?;

        self.data.bring_up = BringUpState::Initialized;
        Ok(())
    }

    /// Reference calibration (VHV and phase) and reference SPAD management.
    /// Crosstalk and offset are left to their own calibration functions.
    pub(crate) fn perform_basic_calibration(&mut self) -> Result<(), Error<A::Error>> {
        let ref_calibration = self
            .api
            .perform_ref_calibration()
            .map_err(|e| self.api_failed("VL53L0X_PerformRefCalibration", e))?;
        self.data.ref_calibration = Some(ref_calibration);

        let ref_spads = self
            .api
            .perform_ref_spad_management()
            .map_err(|e| self.api_failed("VL53L0X_PerformRefSpadManagement", e))?;
        self.data.ref_spads = Some(ref_spads);

        trace!(
            "[{}] VHV {} phase {} SPADs {} aperture {}",
            self.config.name,
            ref_calibration.vhv_settings,
            ref_calibration.phase_cal,
            ref_spads.count,
            ref_spads.is_aperture
        );

        self.data.bring_up = BringUpState::Calibrated;
        Ok(())
    }

    /// Offset calibration against a target at a known distance.
    ///
    /// Not implemented yet: always returns `Error::NotImplemented`.
    ///
    /// # Arguments
    ///
    /// * `target_distance_mm` : Real distance between the sensor and the target.
    pub fn perform_offset_calibration(&mut self, target_distance_mm: u32) -> Result<i32, Error<A::Error>> {
        warn!(
            "[{}] offset calibration at {} mm is not implemented",
            self.config.name,
            target_distance_mm
        );
        Err(Error::NotImplemented)
    }

    /// Crosstalk calibration against a target at a known distance.
    ///
    /// Not implemented yet: always returns `Error::NotImplemented`.
    pub fn perform_xtalk_calibration(&mut self, target_distance_mm: u32) -> Result<FixPoint1616, Error<A::Error>> {
        warn!(
            "[{}] crosstalk calibration at {} mm is not implemented",
            self.config.name,
            target_distance_mm
        );
        Err(Error::NotImplemented)
    }

    /// Not implemented yet: always returns `Error::NotImplemented`.
    pub fn save_offset_calibration(&mut self) -> Result<(), Error<A::Error>> {
        warn!("[{}] saving offset calibration is not implemented", self.config.name);
        Err(Error::NotImplemented)
    }

    /// Not implemented yet: always returns `Error::NotImplemented`.
    pub fn save_xtalk_calibration(&mut self) -> Result<(), Error<A::Error>> {
        warn!("[{}] saving crosstalk calibration is not implemented", self.config.name);
        Err(Error::NotImplemented)
    }
}
