//! The restart button.

use core::convert::Infallible;

use embedded_hal::digital::{
    ErrorType,
    InputPin,
};
use esp_hal::gpio::{
    Input,
    InputConfig,
    Pull,
};

use crate::ButtonResources;

/// Button A, active-low with the internal pull-up.
///
/// Read through [`InputPin`] the level is logical: high means pressed.
pub struct Button {
    pin: Input<'static>,
}

impl From<ButtonResources<'static>> for Button {
    fn from(res: ButtonResources<'static>) -> Self {
        Self {
            pin: Input::new(res.a, InputConfig::default().with_pull(Pull::Up)),
        }
    }
}

impl ErrorType for Button {
    type Error = Infallible;
}

impl InputPin for Button {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.pin.is_low())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.pin.is_high())
    }
}
