use crate::{
    BringUpState, BusOperation, Config, DelayNs, DeviceMode, InputPin, OutputPin, RangingApi, RangingMeasurementData,
    RefCalibration, RefSpads, SevenBitAddress, Vl53l0x,
};

impl<A: RangingApi, XST: OutputPin, GP: InputPin, T: DelayNs> Vl53l0x<A, XST, GP, T> {
    /// This function tells whether the whole bring-up sequence went through.
    ///
    /// # Return
    ///
    /// `true` once measurements are running, `false` before the first fetch or after a failed bring-up.
    pub fn is_started(&self) -> bool {
        self.data.bring_up == BringUpState::Measuring
    }

    /// This function gets the progress of the bring-up sequence.
    ///
    /// # Return
    ///
    /// `state` : Last state reached, or `Faulted` with the transition that failed.
    pub fn state(&self) -> BringUpState {
        self.data.bring_up
    }

    /// This function gets the mode read back from the sensor during bring-up.
    ///
    /// # Return
    ///
    /// `mode` : `None` until the mode was configured.
    pub fn device_mode(&self) -> Option<DeviceMode> {
        self.data.mode
    }

    /// This function gets the raw data of the last fetch.
    pub fn last_measurement(&self) -> &RangingMeasurementData {
        &self.data.measurement
    }

    /// This function gets the VHV and phase settings found by the reference calibration
    /// of the current bring-up.
    pub fn reference_calibration(&self) -> Option<RefCalibration> {
        self.data.ref_calibration
    }

    /// This function gets the reference SPADs selected during the current bring-up.
    pub fn reference_spads(&self) -> Option<RefSpads> {
        self.data.ref_spads
    }

    /// This function gets the address the transport currently talks to.
    ///
    /// # Return
    ///
    /// `address` : 0x29 until the sensor was moved to its configured address.
    pub fn address(&mut self) -> SevenBitAddress {
        self.api.bus().address()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Direct access to the ranging core.
    /// Calls made through it are not tracked by the bring-up state.
    pub fn api(&mut self) -> &mut A {
        &mut self.api
    }
}
