//! Byte-oriented transport between the driver and the controller.
//!
//! The driver only needs two primitives: write a batch of command bytes,
//! and write a run of display-RAM bytes. [`Transport`] names them and is
//! implemented for every [`WriteOnlyDataCommand`], so the I2C and SPI
//! interfaces from `display-interface-*` plug straight in:
//!
//! - I2C prefixes each write with a control byte, `0x00` for commands
//!   and `0x40` for data ([`i2c_transport`]).
//! - SPI drives a separate data/command line ([`spi_transport`]).

use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};
use display_interface_i2c::I2CInterface;
use display_interface_spi::SPIInterface;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;

use crate::command::Command;

/// Default 7-bit I2C address of SSD1306 modules (`0x3D` with SA0 high).
pub const DEFAULT_I2C_ADDRESS: u8 = 0x3C;

/// I2C control byte announcing a stream of display data.
const I2C_DATA_CONTROL_BYTE: u8 = 0x40;

/// Write-only command/data channel to the controller.
///
/// Both methods must preserve byte order. A single call must not be
/// interleaved with writes from another user of the same bus.
pub trait Transport {
    /// Send command bytes.
    fn write_command(&mut self, bytes: &[u8]) -> Result<(), DisplayError>;

    /// Send display-RAM bytes at the controller's current write pointer.
    fn write_data(&mut self, bytes: &[u8]) -> Result<(), DisplayError>;
}

impl<DI> Transport for DI
where
    DI: WriteOnlyDataCommand,
{
    fn write_command(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.send_commands(DataFormat::U8(bytes))
    }

    fn write_data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.send_data(DataFormat::U8(bytes))
    }
}

/// Send `commands` in order, one [`Transport::write_command`] call each.
///
/// Stops at the first failure; later commands are not sent.
pub(crate) fn send_commands<T>(transport: &mut T, commands: &[Command]) -> Result<(), DisplayError>
where
    T: Transport + ?Sized,
{
    for command in commands {
        transport.write_command(&command.encode())?;
    }
    Ok(())
}

/// Build an I2C transport.
///
/// # Arguments
/// * `i2c` — I2C peripheral (takes ownership for exclusive access).
/// * `address` — 7-bit I2C device address (typically `0x3C` or `0x3D`).
pub fn i2c_transport<I2C>(i2c: I2C, address: u8) -> I2CInterface<I2C>
where
    I2C: I2c,
{
    I2CInterface::new(i2c, address, I2C_DATA_CONTROL_BYTE)
}

/// Build a 4-wire SPI transport.
///
/// # Arguments
/// * `spi` — SPI device (owns chip select).
/// * `dc` — data/command select pin, low for commands.
pub fn spi_transport<SPI, DC>(spi: SPI, dc: DC) -> SPIInterface<SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    SPIInterface::new(spi, dc)
}

/// Recording transport for unit tests.
#[cfg(test)]
pub(crate) mod mock {
    use std::vec::Vec;

    use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};

    /// One write observed on the bus.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event {
        Command(Vec<u8>),
        Data(Vec<u8>),
    }

    /// Records every write in order and fails on demand.
    #[derive(Debug, Default)]
    pub struct RecordingInterface {
        pub events: Vec<Event>,
        /// Fail the Nth command write (0-based, counted over the lifetime).
        pub fail_command_at: Option<usize>,
        /// Fail every data write while set.
        pub fail_data: bool,
        pub commands_seen: usize,
    }

    impl RecordingInterface {
        pub fn new() -> Self {
            Self::default()
        }

        /// All command bytes, concatenated in order.
        pub fn command_bytes(&self) -> Vec<u8> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Command(b) => Some(b.clone()),
                    Event::Data(_) => None,
                })
                .flatten()
                .collect()
        }

        /// Every data payload, in order.
        pub fn data_writes(&self) -> Vec<Vec<u8>> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Data(b) => Some(b.clone()),
                    Event::Command(_) => None,
                })
                .collect()
        }

        pub fn clear(&mut self) {
            self.events.clear();
        }
    }

    fn bytes(format: DataFormat<'_>) -> Result<Vec<u8>, DisplayError> {
        match format {
            DataFormat::U8(slice) => Ok(slice.to_vec()),
            _ => Err(DisplayError::DataFormatNotImplemented),
        }
    }

    impl WriteOnlyDataCommand for RecordingInterface {
        fn send_commands(&mut self, cmd: DataFormat<'_>) -> Result<(), DisplayError> {
            let index = self.commands_seen;
            self.commands_seen += 1;
            if self.fail_command_at == Some(index) {
                return Err(DisplayError::BusWriteError);
            }
            let bytes = bytes(cmd)?;
            self.events.push(Event::Command(bytes));
            Ok(())
        }

        fn send_data(&mut self, buf: DataFormat<'_>) -> Result<(), DisplayError> {
            if self.fail_data {
                return Err(DisplayError::BusWriteError);
            }
            let bytes = bytes(buf)?;
            self.events.push(Event::Data(bytes));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{Event, RecordingInterface};
    use super::*;

    #[test]
    fn blanket_impl_forwards_commands_and_data() {
        let mut di = RecordingInterface::new();
        di.write_command(&[0xAE]).unwrap();
        di.write_data(&[1, 2, 3]).unwrap();
        assert_eq!(
            di.events,
            [Event::Command(vec![0xAE]), Event::Data(vec![1, 2, 3])]
        );
    }

    #[test]
    fn failures_surface_as_display_errors() {
        let mut di = RecordingInterface {
            fail_command_at: Some(1),
            fail_data: true,
            ..RecordingInterface::default()
        };
        assert!(di.write_command(&[0xAE]).is_ok());
        assert!(matches!(
            di.write_command(&[0xAF]),
            Err(DisplayError::BusWriteError)
        ));
        assert!(matches!(
            di.write_data(&[0]),
            Err(DisplayError::BusWriteError)
        ));
        assert_eq!(di.events.len(), 1);
    }

    #[test]
    fn commands_are_written_one_per_call() {
        let mut di = RecordingInterface::new();
        send_commands(&mut di, &[Command::DisplayOn(false), Command::Contrast(0x10)]).unwrap();
        assert_eq!(
            di.events,
            [Event::Command(vec![0xAE]), Event::Command(vec![0x81, 0x10])]
        );
    }

    #[test]
    fn command_failure_stops_the_batch() {
        let mut di = RecordingInterface {
            fail_command_at: Some(0),
            ..RecordingInterface::default()
        };
        assert!(send_commands(&mut di, &[Command::DisplayOn(false), Command::DisplayOn(true)]).is_err());
        assert!(di.events.is_empty());
        assert_eq!(di.commands_seen, 1);
    }
}
