mod common;

use core::cell::RefCell;

use common::*;
use embedded_hal_bus::i2c::RefCellDevice;
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction};
use embedded_hal_mock::eh1::i2c::Mock as I2cMock;
use vl53l0x::{Channel, Config, NoPin, Vl53l0x, VL53L0X_CHIP_ID};

#[test]
fn sensors_sharing_a_bus_are_moved_one_by_one() {
    let mut i2c = I2cMock::new(&[
        set_address(0x30),
        who_am_i(0x30, VL53L0X_CHIP_ID),
        set_address(0x31),
        who_am_i(0x31, VL53L0X_CHIP_ID),
    ]);
    let i2c_bus = RefCell::new(i2c.clone());

    let xshut_transactions = [PinTransaction::set(PinState::Low), PinTransaction::set(PinState::High)];
    let mut xshut_left = PinMock::new(&xshut_transactions);
    let mut xshut_right = PinMock::new(&xshut_transactions);

    let mut left = Vl53l0x::new(
        fake_api(RefCellDevice::new(&i2c_bus)),
        Some(xshut_left.clone()),
        None::<NoPin>,
        RecordingDelay::default(),
        Config::default().with_name("left").with_address(0x30).with_reconfigure_address(true),
    )
    .unwrap();
    let mut right = Vl53l0x::new(
        fake_api(RefCellDevice::new(&i2c_bus)),
        Some(xshut_right.clone()),
        None::<NoPin>,
        RecordingDelay::default(),
        Config::default().with_name("right").with_address(0x31).with_reconfigure_address(true),
    )
    .unwrap();

    left.init().unwrap();
    right.init().unwrap();

    left.api().next_measurement = measurement_mm(100);
    right.api().next_measurement = measurement_mm(700);

    left.fetch(Channel::All).unwrap();
    right.fetch(Channel::All).unwrap();
    left.fetch(Channel::All).unwrap();
    right.fetch(Channel::All).unwrap();

    assert_eq!(left.address(), 0x30);
    assert_eq!(right.address(), 0x31);
    assert_eq!(left.last_measurement().range_millimeter, 100);
    assert_eq!(right.last_measurement().range_millimeter, 700);
    assert_eq!(left.api().count("VL53L0X_DataInit"), 1);
    assert_eq!(right.api().count("VL53L0X_DataInit"), 1);

    i2c.done();
    xshut_left.done();
    xshut_right.done();
}
