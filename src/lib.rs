//! # VL53L0X driver
//!
//! This crate provides a platform-agnostic driver for the ST VL53L0X time-of-flight ranging sensor.
//! The [ST page](https://www.st.com/en/imaging-and-photonics-solutions/vl53l0x.html) provide all necessary information.
//! This driver was built using the [embedded-hal](https://docs.rs/embedded-hal/latest/embedded_hal/) traits.
//!
//! The driver owns the bring-up sequence of the sensor (power up through XSHUT, optional I2C
//! address change, identification, reference calibration, range profile, measurement start) and
//! the fetch/convert path exposing a distance and a proximity channel. The register-level ranging
//! algorithm is provided by a port of the ST API implementing [`RangingApi`], over a [`BusOperation`]
//! transport such as [`Vl53l0xI2C`].
//!
//! ## Instantiating
//!
//! ```rust,ignore
//! let i2c_bus = RefCell::new(i2c);
//! let api = MyVl53l0xPort::new(Vl53l0xI2C::new(RefCellDevice::new(&i2c_bus)));
//!
//! let config = Config::default()
//!     .with_address(0x30)
//!     .with_reconfigure_address(true)
//!     .with_continuous_range(true);
//!
//! let mut sensor = Vl53l0x::new(api, Some(xshut_pin), None::<NoPin>, tim, config).unwrap();
//! sensor.init().unwrap(); // holds the sensor in shutdown until the first fetch
//! ```
//!
//! ### Loop:
//! ```rust,ignore
//! loop {
//!     sensor.fetch(Channel::All).unwrap(); // first call runs the bring-up sequence
//!     let distance = sensor.read(Channel::Distance).unwrap();
//!     let proximity = sensor.read(Channel::Proximity).unwrap();
//! }
//! ```
//!
//! ## Multiple instances with I2C
//!
//! Every VL53L0X answers on 0x29 after power up. Enable `reconfigure_address` on each instance and
//! call `init()` on all of them first: it pulls every XSHUT low. Each instance is then released and
//! moved to its own address on its first fetch.

#![cfg_attr(not(test), no_std)]

mod fmt; // must stay first, the logging macros are used by every module below

pub mod accessors;
pub mod api;
pub mod bus_operation;
pub mod calibration;
pub mod consts;
pub mod measurement_mode;
pub mod range_profile;
pub mod sample;

pub use api::*;
pub use bus_operation::*;
pub use consts::*;
pub use range_profile::*;
pub use sample::*;

use core::convert::Infallible;

use embedded_hal::{
    delay::DelayNs,
    digital::{Error as _, ErrorKind, ErrorType, InputPin, OutputPin},
    i2c::SevenBitAddress,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error<B> {
    /// Transport or ranging core failure
    Bus(B),
    /// XSHUT or GPIO1 failure
    Gpio(ErrorKind),
    NotSupported,
    InvalidConfig,
    NotImplemented,
}

impl<B: core::fmt::Debug> core::fmt::Display for Error<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus error: {:?}", e),
            Error::Gpio(kind) => write!(f, "gpio error: {:?}", kind),
            Error::NotSupported => write!(f, "device or operation not supported"),
            Error::InvalidConfig => write!(f, "invalid configuration"),
            Error::NotImplemented => write!(f, "not implemented"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<B> defmt::Format for Error<B> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Bus(_) => defmt::write!(f, "Bus"),
            Error::Gpio(_) => defmt::write!(f, "Gpio"),
            Error::NotSupported => defmt::write!(f, "NotSupported"),
            Error::InvalidConfig => defmt::write!(f, "InvalidConfig"),
            Error::NotImplemented => defmt::write!(f, "NotImplemented"),
        }
    }
}

/// Static configuration of one sensor instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Prefix of every log line of this instance.
    pub name: &'static str,
    /// Address the sensor is used on once started.
    pub address: SevenBitAddress,
    /// Move the sensor from 0x29 to `address` during bring-up. Requires XSHUT.
    pub reconfigure_address: bool,
    /// Continuous ranging, single shot otherwise.
    pub continuous_range: bool,
    /// Gate fetches on GPIO1. Requires GPIO1.
    pub gpio_in_range: bool,
    /// GPIO1 is asserted when low. The sensor drives it low on a target within
    /// `proximity_threshold_mm`, so this stays set unless the line is inverted on the board.
    pub gpio_active_low: bool,
    pub proximity_threshold_mm: u32,
    /// Profile applied during bring-up.
    pub range_profile: RangeProfile,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            name: "vl53l0x",
            address: VL53L0X_DEFAULT_I2C_ADDRESS,
            reconfigure_address: false,
            continuous_range: false,
            gpio_in_range: false,
            gpio_active_low: true,
            proximity_threshold_mm: VL53L0X_DEFAULT_PROXIMITY_THRESHOLD_MM,
            range_profile: RangeProfile::HighSpeed,
        }
    }
}

impl Config {
    /// This function sets the prefix of the log lines of this instance.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// This function sets the address the sensor is used on once started.
    ///
    /// # Arguments
    ///
    /// * `address` : 7-bit address. Anything but 0x29 requires `with_reconfigure_address(true)`.
    pub fn with_address(mut self, address: SevenBitAddress) -> Self {
        self.address = address;
        self
    }

    /// This function enables moving the sensor to the configured address during bring-up.
    /// XSHUT must be wired.
    pub fn with_reconfigure_address(mut self, enable: bool) -> Self {
        self.reconfigure_address = enable;
        self
    }

    /// This function selects continuous ranging instead of single shot.
    pub fn with_continuous_range(mut self, enable: bool) -> Self {
        self.continuous_range = enable;
        self
    }

    /// This function enables gating fetches on GPIO1. GPIO1 must be wired.
    pub fn with_gpio_in_range(mut self, enable: bool) -> Self {
        self.gpio_in_range = enable;
        self
    }

    /// This function sets the level at which GPIO1 is read as asserted.
    ///
    /// # Arguments
    ///
    /// * `active_low` : `true` (default) when the line reaches the MCU as driven by the sensor.
    pub fn with_gpio_active_low(mut self, active_low: bool) -> Self {
        self.gpio_active_low = active_low;
        self
    }

    /// This function sets the distance at or below which the proximity channel reads 1.
    /// The same value is the low threshold of the GPIO1 interrupt.
    pub fn with_proximity_threshold_mm(mut self, threshold_mm: u32) -> Self {
        self.proximity_threshold_mm = threshold_mm;
        self
    }

    /// This function sets the range profile applied during bring-up.
    pub fn with_range_profile(mut self, profile: RangeProfile) -> Self {
        self.range_profile = profile;
        self
    }

    /// This function gets the ranging mode matching `continuous_range`.
    pub fn device_mode(&self) -> DeviceMode {
        if self.continuous_range {
            DeviceMode::ContinuousRanging
        } else {
            DeviceMode::SingleRanging
        }
    }
}

/// Transition of the bring-up sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BringUpStep {
    Identify,
    Initialize,
    Calibrate,
    ConfigureMode,
    StartMeasurement,
}

/// Progress of the bring-up sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BringUpState {
    Uninitialized,
    Identified,
    Initialized,
    Calibrated,
    ModeConfigured,
    Measuring,
    /// The given transition failed. The next fetch restarts from `Uninitialized`.
    Faulted(BringUpStep),
}

impl BringUpState {
    /// Transition attempted from this state.
    fn next_step(self) -> BringUpStep {
        match self {
            BringUpState::Uninitialized | BringUpState::Faulted(_) => BringUpStep::Identify,
            BringUpState::Identified => BringUpStep::Initialize,
            BringUpState::Initialized => BringUpStep::Calibrate,
            BringUpState::Calibrated => BringUpStep::ConfigureMode,
            BringUpState::ModeConfigured | BringUpState::Measuring => BringUpStep::StartMeasurement,
        }
    }
}

/// Mutable data of one instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceState {
    pub bring_up: BringUpState,
    pub mode: Option<DeviceMode>,
    pub measurement: RangingMeasurementData,
    pub ref_calibration: Option<RefCalibration>,
    pub ref_spads: Option<RefSpads>,
}

impl DeviceState {
    pub fn new() -> Self {
        DeviceState {
            bring_up: BringUpState::Uninitialized,
            mode: None,
            measurement: RangingMeasurementData {
                range_millimeter: VL53L0X_RANGE_NO_DATA_MM,
                ..RangingMeasurementData::default()
            },
            ref_calibration: None,
            ref_spads: None,
        }
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

/// Placeholder for an unwired XSHUT or GPIO1 line.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

pub struct Vl53l0x<A: RangingApi, XST: OutputPin, GP: InputPin, T: DelayNs> {
    pub(crate) api: A,
    pub(crate) xshut_pin: Option<XST>,
    pub(crate) gpio1_pin: Option<GP>,
    pub(crate) tim: T,
    pub(crate) config: Config,
    pub(crate) data: DeviceState,
}

impl<A, XST, GP, T> Vl53l0x<A, XST, GP, T>
where
    A: RangingApi,
    XST: OutputPin,
    GP: InputPin,
    T: DelayNs,
{
    /// Creates an instance and checks that the wiring supports the requested options.
    ///
    /// # Arguments
    ///
    /// * `api` : ranging core, talking to the sensor at its power-up address.
    /// * `xshut_pin` : XSHUT line, already configured as an output.
    /// * `gpio1_pin` : GPIO1 line, already configured as an input with pull-up.
    /// * `tim` : delay provider.
    /// * `config` : instance options.
    pub fn new(
        api: A,
        xshut_pin: Option<XST>,
        gpio1_pin: Option<GP>,
        tim: T,
        config: Config,
    ) -> Result<Self, Error<A::Error>> {
        if config.reconfigure_address {
            if xshut_pin.is_none() {
                error!("[{}] Missing XSHUT gpio spec", config.name);
                return Err(Error::NotSupported);
            }
        } else if config.address != VL53L0X_DEFAULT_I2C_ADDRESS {
            error!(
                "[{}] Invalid device address (should be {:#x} or reconfigure_address should be enabled)",
                config.name,
                VL53L0X_DEFAULT_I2C_ADDRESS
            );
            return Err(Error::NotSupported);
        }

        if config.gpio_in_range && gpio1_pin.is_none() {
            error!("[{}] No or improper gpio1 specified in config", config.name);
            return Err(Error::InvalidConfig);
        }

        Ok(Vl53l0x {
            api,
            xshut_pin,
            gpio1_pin,
            tim,
            config,
            data: DeviceState::new(),
        })
    }

    /// With address reconfiguration the sensor is held in shutdown until the first fetch,
    /// otherwise the bring-up sequence runs right away.
    pub fn init(&mut self) -> Result<(), Error<A::Error>> {
        let name = self.config.name;

        if self.config.reconfigure_address {
            self.off()?;
            debug!("[{}] Shutdown", name);
        } else {
            self.start()?;
        }

        debug!("[{}] Initialized", name);
        Ok(())
    }

    /// Gives back the ranging core, the pins and the delay provider.
    pub fn release(self) -> (A, Option<XST>, Option<GP>, T) {
        (self.api, self.xshut_pin, self.gpio1_pin, self.tim)
    }

    pub(crate) fn delay(&mut self, ms: u32) {
        self.tim.delay_ms(ms);
    }

    /// Pulls XSHUT low, if wired.
    pub fn off(&mut self) -> Result<(), Error<A::Error>> {
        if let Some(pin) = self.xshut_pin.as_mut() {
            if let Err(e) = pin.set_low() {
                error!("[{}] Unable to shutdown sensor", self.config.name);
                return Err(Error::Gpio(e.kind()));
            }
        }
        Ok(())
    }

    /// Logs a failed ranging core call and wraps its error.
    pub(crate) fn api_failed(&self, step: &'static str, e: A::Error) -> Error<A::Error> {
        error!("[{}] {} failed", self.config.name, step);
        Error::Bus(e)
    }

    /// Releases XSHUT, moves the sensor to its configured address and checks its identity.
    pub(crate) fn power_up_and_identify(&mut self) -> Result<(), Error<A::Error>> {
        let name = self.config.name;

        if let Some(pin) = self.xshut_pin.as_mut() {
            if let Err(e) = pin.set_high() {
                error!("[{}] Unable to set XSHUT gpio", name);
                return Err(Error::Gpio(e.kind()));
            }
            self.delay(VL53L0X_BOOT_DELAY_MS);
        }

        let address = self.config.address;
        if self.config.reconfigure_address && address != self.api.bus().address() {
            self.api
                .set_device_address(address)
                .map_err(|e| self.api_failed("Reconfigure I2C address", e))?;
            debug!("[{}] I2C address reconfigured to {:#x}", name, address);
            self.delay(VL53L0X_BOOT_DELAY_MS);
        }

        let info = match self.api.get_device_info() {
            Ok(info) => info,
            Err(_) => {
                error!("[{}] Could not get info from device.", name);
                return Err(Error::NotSupported);
            }
        };
        debug!("   Device Name : {}", info.name.as_str());
        debug!("   Device Type : {}", info.device_type.as_str());
        debug!("   Device ID : {}", info.product_id.as_str());
        debug!("   ProductRevisionMajor : {}", info.product_revision_major);
        debug!("   ProductRevisionMinor : {}", info.product_revision_minor);

        match self.api.read_word(VL53L0X_REG_WHO_AM_I) {
            Ok(VL53L0X_CHIP_ID) => {}
            _ => {
                error!("[{}] Issue on device identification", name);
                return Err(Error::NotSupported);
            }
        }

        self.data.bring_up = BringUpState::Identified;
        Ok(())
    }

    /// Runs the whole bring-up sequence. Any failure leaves the instance not started,
    /// and the next call starts over from power up.
    pub(crate) fn start(&mut self) -> Result<(), Error<A::Error>> {
        let name = self.config.name;
        debug!("[{}] Starting", name);

        self.data.bring_up = BringUpState::Uninitialized;
        self.data.mode = None;
        self.data.ref_calibration = None;
        self.data.ref_spads = None;

        if let Err(e) = self.bring_up() {
            let step = self.data.bring_up.next_step();
            error!("[{}] Bring-up failed at {:?}", name, step);
            self.data.bring_up = BringUpState::Faulted(step);
            return Err(e);
        }

        self.data.bring_up = BringUpState::Measuring;
        debug!("[{}] Started", name);
        Ok(())
    }

    fn bring_up(&mut self) -> Result<(), Error<A::Error>> {
        self.power_up_and_identify()?;
        self.calibrate()?;
        let config = self.config;
        self.configure_mode(
            config.device_mode(),
            config.gpio_in_range,
            config.proximity_threshold_mm,
            config.range_profile,
        )
    }
}
