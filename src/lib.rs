//! Platform-agnostic register-level driver for the DS3231 real-time clock.
//!
//! The DS3231 keeps battery-backed time/date in BCD-encoded registers behind
//! an I2C interface and offers two programmable alarms, a square-wave output
//! and a handful of status flags. This crate translates between host types
//! and the device's packed register layout, keeping every multi-byte access
//! in a single bus transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use ds3231_rtc::{Alarm, Alarm1, Alarm1Match, DateTime, Ds3231, DEFAULT_ADDRESS};
//!
//! let mut rtc = Ds3231::new(i2c, DEFAULT_ADDRESS);
//!
//! // Set the clock, then read it back.
//! rtc.set_datetime(&DateTime::new(2023, 6, 15, 10, 30).with_second(45))?;
//! let now = rtc.datetime()?;
//!
//! // Fire alarm 1 at second 30 of every minute, with the interrupt pin armed.
//! rtc.set_alarm1(&Alarm1::new(Alarm1Match::Seconds).at_second(30), true)?;
//! loop {
//!     if rtc.check_and_clear_alarm(Alarm::One)? {
//!         // handle the tick
//!     }
//! }
//! ```
//!
//! # Concurrency
//!
//! The driver is synchronous and does not serialize callers. Sharing one
//! [`Ds3231`] instance (or the underlying bus) across threads or interrupt
//! contexts without external locking will interleave read-modify-write
//! sequences on the control and status registers and corrupt unrelated
//! bits; synchronization is the caller's obligation.

#![no_std]

#[macro_use]
mod fmt;

pub mod alarm;
pub mod bcd;
pub mod datetime;
pub mod registers;

#[cfg(feature = "async")]
pub mod asynch;

use embedded_hal::i2c::I2c;

pub use alarm::{Alarm, Alarm1, Alarm1Match, Alarm2, Alarm2Match, InterruptTarget};
pub use bcd::{decode_bcd, encode_bcd};
pub use datetime::DateTime;
pub use registers::{Control, Register, SquareWave, Status, Temperature};

/// Factory-default I2C address of the device.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Driver error.
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The underlying bus transaction failed; propagated unchanged, never
    /// retried.
    Bus(E),
    /// An input field was outside its documented range; rejected before any
    /// bus traffic.
    InvalidValue(&'static str),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Bus(e)
    }
}

/// DS3231 driver over a blocking I2C bus.
pub struct Ds3231<I2C> {
    i2c: I2C,
    address: u8,
}

// Generates a get/set accessor pair for a single-byte register.
macro_rules! register_access {
    ($(($name:ident, $reg:expr, $typ:ty)),+ $(,)?) => {
        impl<I2C: I2c> Ds3231<I2C> {
            $(paste::paste! {
                #[doc = concat!("Reads the ", stringify!($name), " register.")]
                pub fn $name(&mut self) -> Result<$typ, Error<I2C::Error>> {
                    Ok(<$typ>::from(self.read_register($reg)?))
                }

                #[doc = concat!("Writes the ", stringify!($name), " register.")]
                pub fn [<set_ $name>](&mut self, value: $typ) -> Result<(), Error<I2C::Error>> {
                    self.write_register($reg, value.into())
                }
            })+
        }
    };
}

register_access!(
    (control, Register::Control, Control),
    (status, Register::Status, Status),
);

impl<I2C: I2c> Ds3231<I2C> {
    /// Creates a driver for the device at `address` (usually
    /// [`DEFAULT_ADDRESS`]).
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Consumes the driver and returns the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_register(&mut self, reg: Register) -> Result<u8, Error<I2C::Error>> {
        let mut data = [0];
        self.i2c.write_read(self.address, &[reg as u8], &mut data)?;
        Ok(data[0])
    }

    fn write_register(&mut self, reg: Register, value: u8) -> Result<(), Error<I2C::Error>> {
        debug!("writing register {}: {}", reg as u8, value);
        self.i2c.write(self.address, &[reg as u8, value])?;
        Ok(())
    }

    fn read_registers<const N: usize>(
        &mut self,
        reg: Register,
    ) -> Result<[u8; N], Error<I2C::Error>> {
        let mut data = [0; N];
        self.i2c.write_read(self.address, &[reg as u8], &mut data)?;
        Ok(data)
    }

    /// Reads the current date and time in one 7-byte transaction.
    ///
    /// The hour is always reported in 24-hour form, whichever mode the hour
    /// register is in. If the oscillator-stop flag is set the value decoded
    /// here may predate a power loss; the condition is reported through the
    /// logging side channel and the best-effort value is still returned —
    /// call [`Ds3231::oscillator_stopped`] to test for it explicitly.
    pub fn datetime(&mut self) -> Result<DateTime, Error<I2C::Error>> {
        let data: [u8; 7] = self.read_registers(Register::DateTime)?;
        let datetime = DateTime::from_registers(&data);
        if self.oscillator_stopped()? {
            warning!("oscillator stop flag set; returned time may be inaccurate");
        }
        Ok(datetime)
    }

    /// Sets the date and time in one 7-byte transaction.
    ///
    /// The hour byte is written in 24-hour form and the year is truncated to
    /// its last two digits (2- and 4-digit years are both accepted). Setting
    /// the time restores timekeeping confidence, so the oscillator-stop flag
    /// is cleared afterwards unconditionally.
    pub fn set_datetime(&mut self, datetime: &DateTime) -> Result<(), Error<I2C::Error>> {
        let d = datetime.to_registers()?;
        self.i2c.write(
            self.address,
            &[
                Register::DateTime as u8,
                d[0],
                d[1],
                d[2],
                d[3],
                d[4],
                d[5],
                d[6],
            ],
        )?;
        self.clear_oscillator_stop_flag()
    }

    /// Reads the raw control register; the square-wave frequency and
    /// interrupt-control bits describe the current pin configuration.
    pub fn square_wave_config(&mut self) -> Result<Control, Error<I2C::Error>> {
        self.control()
    }

    /// Configures the square-wave output via read-modify-write.
    ///
    /// Disabling sets the interrupt-control bit and clears the frequency
    /// select, handing the pin to the alarm-interrupt function; enabling
    /// does the reverse. Alarm enables and every other control bit are
    /// preserved.
    pub fn set_square_wave(&mut self, mode: SquareWave) -> Result<(), Error<I2C::Error>> {
        let mut control = self.control()?;
        match mode.rate_select() {
            None => {
                control.set_interrupt_control(true);
                control.set_square_wave_frequency(0);
            }
            Some(rs) => {
                control.set_interrupt_control(false);
                control.set_square_wave_frequency(rs);
            }
        }
        self.set_control(control)
    }

    /// Reads the four raw Alarm 1 register bytes in one transaction.
    pub fn alarm1(&mut self) -> Result<[u8; 4], Error<I2C::Error>> {
        self.read_registers(Register::Alarm1)
    }

    /// Reads the three raw Alarm 2 register bytes in one transaction.
    pub fn alarm2(&mut self) -> Result<[u8; 3], Error<I2C::Error>> {
        self.read_registers(Register::Alarm2)
    }

    /// Programs Alarm 1 and returns the register bytes written.
    ///
    /// Writes all four alarm bytes in one transaction, then applies
    /// `interrupt_enable` to the alarm's enable bit and clears any pending
    /// flag left over from before the reconfiguration, so a stale match
    /// cannot re-trigger immediately.
    pub fn set_alarm1(
        &mut self,
        alarm: &Alarm1,
        interrupt_enable: bool,
    ) -> Result<[u8; 4], Error<I2C::Error>> {
        let d = alarm.to_registers()?;
        self.i2c.write(
            self.address,
            &[Register::Alarm1 as u8, d[0], d[1], d[2], d[3]],
        )?;
        self.set_alarm_interrupt(interrupt_enable, InterruptTarget::Alarm1)?;
        self.check_and_clear_alarm(Alarm::One)?;
        Ok(d)
    }

    /// Programs Alarm 2 and returns the register bytes written.
    ///
    /// Same sequence as [`Ds3231::set_alarm1`], minus the seconds register.
    pub fn set_alarm2(
        &mut self,
        alarm: &Alarm2,
        interrupt_enable: bool,
    ) -> Result<[u8; 3], Error<I2C::Error>> {
        let d = alarm.to_registers()?;
        self.i2c
            .write(self.address, &[Register::Alarm2 as u8, d[0], d[1], d[2]])?;
        self.set_alarm_interrupt(interrupt_enable, InterruptTarget::Alarm2)?;
        self.check_and_clear_alarm(Alarm::Two)?;
        Ok(d)
    }

    /// Sets or clears the interrupt enable for the targeted alarm(s) and
    /// returns the resulting control value.
    ///
    /// Enabling also switches the INT/SQW pin to the alarm-interrupt
    /// function so a match reaches the pin. `Both` performs one independent
    /// read-modify-write cycle per alarm rather than assuming the two bit
    /// groups can be updated atomically together.
    pub fn set_alarm_interrupt(
        &mut self,
        enable: bool,
        target: InterruptTarget,
    ) -> Result<Control, Error<I2C::Error>> {
        let mut control = Control::default();
        if matches!(target, InterruptTarget::Alarm1 | InterruptTarget::Both) {
            control = self.control()?;
            control.set_alarm1_interrupt_enable(enable);
            if enable {
                control.set_interrupt_control(true);
            }
            self.set_control(control)?;
        }
        if matches!(target, InterruptTarget::Alarm2 | InterruptTarget::Both) {
            control = self.control()?;
            control.set_alarm2_interrupt_enable(enable);
            if enable {
                control.set_interrupt_control(true);
            }
            self.set_control(control)?;
        }
        Ok(control)
    }

    /// Tests and clears the pending flag of one alarm.
    ///
    /// Returns `true` and writes the status back with only that alarm's flag
    /// zeroed when the flag was set; returns `false` without any write when
    /// it was not. The other alarm's flag is never touched, so a match that
    /// lands between the read and the write-back survives.
    pub fn check_and_clear_alarm(&mut self, alarm: Alarm) -> Result<bool, Error<I2C::Error>> {
        let mut status = self.status()?;
        let pending = match alarm {
            Alarm::One => status.alarm1_flag(),
            Alarm::Two => status.alarm2_flag(),
        };
        if !pending {
            return Ok(false);
        }
        match alarm {
            Alarm::One => status.set_alarm1_flag(false),
            Alarm::Two => status.set_alarm2_flag(false),
        }
        self.set_status(status)?;
        Ok(true)
    }

    /// Enables or disables the 32.768 kHz output via read-modify-write of
    /// the status register; the flag bits are left alone.
    pub fn set_32khz_output(&mut self, enable: bool) -> Result<(), Error<I2C::Error>> {
        let mut status = self.status()?;
        status.set_enable_32khz_output(enable);
        self.set_status(status)
    }

    /// Whether timekeeping was interrupted (typically by power loss) since
    /// the flag was last cleared. Pure read, no mutation.
    pub fn oscillator_stopped(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.status()?.oscillator_stop_flag())
    }

    /// Whether the device is busy with TCXO frequency trimming. Purely
    /// informational; callers that need to wait must poll.
    pub fn is_busy(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.status()?.busy())
    }

    /// Reads the aging offset register.
    pub fn aging_offset(&mut self) -> Result<i8, Error<I2C::Error>> {
        Ok(self.read_register(Register::AgingOffset)? as i8)
    }

    /// Writes the aging offset register.
    pub fn set_aging_offset(&mut self, offset: i8) -> Result<(), Error<I2C::Error>> {
        self.write_register(Register::AgingOffset, offset as u8)
    }

    /// Reads the temperature registers in one 2-byte transaction.
    pub fn temperature(&mut self) -> Result<Temperature, Error<I2C::Error>> {
        let data: [u8; 2] = self.read_registers(Register::Temperature)?;
        Ok(Temperature::from_registers(data[0], data[1]))
    }

    fn clear_oscillator_stop_flag(&mut self) -> Result<(), Error<I2C::Error>> {
        let mut status = self.status()?;
        status.set_oscillator_stop_flag(false);
        self.set_status(status)
    }
}
