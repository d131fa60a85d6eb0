use crate::consts::VL53L0X_DEFAULT_I2C_ADDRESS;
use embedded_hal::i2c::{I2c, SevenBitAddress};

/// Byte-level transport to one sensor.
///
/// The sensor's address can be reprogrammed at runtime, so the transport
/// carries the address it currently talks to and lets the ranging core retarget it.
pub trait BusOperation {
    type Error;

    fn read(&mut self, rbuf: &mut [u8]) -> Result<(), Self::Error>;
    fn write(&mut self, wbuf: &[u8]) -> Result<(), Self::Error>;
    fn write_read(&mut self, wbuf: &[u8], rbuf: &mut [u8]) -> Result<(), Self::Error>;

    fn address(&self) -> SevenBitAddress;
    fn set_address(&mut self, address: SevenBitAddress);
}

pub struct Vl53l0xI2C<P> {
    i2c: P,
    address: SevenBitAddress,
}

impl<P: I2c> Vl53l0xI2C<P> {
    /// Transport talking to the power-up address (0x29).
    pub fn new(i2c: P) -> Self {
        Vl53l0xI2C { i2c, address: VL53L0X_DEFAULT_I2C_ADDRESS }
    }

    /// Transport for a sensor that already answers on `address`,
    /// e.g. one reprogrammed earlier without a power cycle since.
    pub fn with_address(i2c: P, address: SevenBitAddress) -> Self {
        Vl53l0xI2C { i2c, address }
    }

    pub fn release(self) -> P {
        self.i2c
    }
}

impl<P: I2c> BusOperation for Vl53l0xI2C<P> {
    type Error = P::Error;

    #[inline]
    fn read(&mut self, rbuf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.read(self.address, rbuf)?;

        Ok(())
    }

    #[inline]
    fn write(&mut self, wbuf: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(self.address, wbuf)?;

        Ok(())
    }

    #[inline]
    fn write_read(&mut self, wbuf: &[u8], rbuf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, wbuf, rbuf)?;

        Ok(())
    }

    #[inline]
    fn address(&self) -> SevenBitAddress {
        self.address
    }

    #[inline]
    fn set_address(&mut self, address: SevenBitAddress) {
        self.address = address;
    }
}
