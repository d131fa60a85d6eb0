use embedded_hal::i2c::SevenBitAddress;

/// Address the sensor answers on after every power-up.
pub const VL53L0X_DEFAULT_I2C_ADDRESS: SevenBitAddress = 0x29;

/// Expected content of the identification register.
pub const VL53L0X_CHIP_ID: u16 = 0xEEAA;

pub(crate) const VL53L0X_REG_WHO_AM_I: u8 = 0xC0;
pub(crate) const VL53L0X_REG_I2C_SLAVE_DEVICE_ADDRESS: u8 = 0x8A;

/// Startup time after XSHUT release and settle time after an address change.
pub(crate) const VL53L0X_BOOT_DELAY_MS: u32 = 2;

/// Range reported when the ready line says no new sample is available.
pub const VL53L0X_RANGE_NO_DATA_MM: u16 = 9999;

/// Upper interrupt threshold; only the low threshold is meaningful for proximity gating.
pub(crate) const VL53L0X_INTERRUPT_THRESHOLD_HIGH_MM: u32 = 10000;

pub(crate) const VL53L0X_GPIO_PIN: u8 = 0;
pub(crate) const VL53L0X_INTERRUPT_MASK_ALL: u32 = 0;

pub const VL53L0X_DEFAULT_PROXIMITY_THRESHOLD_MM: u32 = 100;

pub(crate) const VL53L0X_PRE_RANGE_VCSEL_PERIOD_LONG_RANGE: u8 = 18;
pub(crate) const VL53L0X_FINAL_RANGE_VCSEL_PERIOD_LONG_RANGE: u8 = 14;
