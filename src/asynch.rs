//! Async driver, enabled by the `async` feature.
//!
//! Identical semantics and transaction layout to the blocking driver in the
//! crate root, over [`embedded_hal_async::i2c::I2c`].

use embedded_hal_async::i2c::I2c;

use crate::alarm::{Alarm, Alarm1, Alarm2, InterruptTarget};
use crate::datetime::DateTime;
use crate::registers::{Control, Register, SquareWave, Status, Temperature};
use crate::Error;

/// DS3231 driver over an async I2C bus.
///
/// Callers still own serialization: two tasks driving the same device can
/// interleave read-modify-write sequences just as two threads can with the
/// blocking driver.
pub struct Ds3231<I2C> {
    i2c: I2C,
    address: u8,
}

macro_rules! register_access {
    ($(($name:ident, $reg:expr, $typ:ty)),+ $(,)?) => {
        impl<I2C: I2c> Ds3231<I2C> {
            $(paste::paste! {
                #[doc = concat!("Reads the ", stringify!($name), " register.")]
                pub async fn $name(&mut self) -> Result<$typ, Error<I2C::Error>> {
                    Ok(<$typ>::from(self.read_register($reg).await?))
                }

                #[doc = concat!("Writes the ", stringify!($name), " register.")]
                pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), Error<I2C::Error>> {
                    self.write_register($reg, value.into()).await
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
    /// [`crate::DEFAULT_ADDRESS`]).
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Consumes the driver and returns the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    async fn read_register(&mut self, reg: Register) -> Result<u8, Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[reg as u8], &mut data)
            .await?;
        Ok(data[0])
    }

    async fn write_register(&mut self, reg: Register, value: u8) -> Result<(), Error<I2C::Error>> {
        debug!("writing register {}: {}", reg as u8, value);
        self.i2c.write(self.address, &[reg as u8, value]).await?;
        Ok(())
    }

    async fn read_registers<const N: usize>(
        &mut self,
        reg: Register,
    ) -> Result<[u8; N], Error<I2C::Error>> {
        let mut data = [0; N];
        self.i2c
            .write_read(self.address, &[reg as u8], &mut data)
            .await?;
        Ok(data)
    }

    /// Reads the current date and time in one 7-byte transaction.
    ///
    /// See the blocking [`crate::Ds3231::datetime`] for the oscillator-stop
    /// caveat; the behavior is the same.
    pub async fn datetime(&mut self) -> Result<DateTime, Error<I2C::Error>> {
        let data: [u8; 7] = self.read_registers(Register::DateTime).await?;
        let datetime = DateTime::from_registers(&data);
        if self.oscillator_stopped().await? {
            warning!("oscillator stop flag set; returned time may be inaccurate");
        }
        Ok(datetime)
    }

    /// Sets the date and time in one 7-byte transaction, then clears the
    /// oscillator-stop flag.
    pub async fn set_datetime(&mut self, datetime: &DateTime) -> Result<(), Error<I2C::Error>> {
        let d = datetime.to_registers()?;
        self.i2c
            .write(
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
            )
            .await?;
        self.clear_oscillator_stop_flag().await
    }

    /// Reads the raw control register.
    pub async fn square_wave_config(&mut self) -> Result<Control, Error<I2C::Error>> {
        self.control().await
    }

    /// Configures the square-wave output via read-modify-write, preserving
    /// alarm enables and every other unrelated control bit.
    pub async fn set_square_wave(&mut self, mode: SquareWave) -> Result<(), Error<I2C::Error>> {
        let mut control = self.control().await?;
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
        self.set_control(control).await
    }

    /// Reads the four raw Alarm 1 register bytes in one transaction.
    pub async fn alarm1(&mut self) -> Result<[u8; 4], Error<I2C::Error>> {
        self.read_registers(Register::Alarm1).await
    }

    /// Reads the three raw Alarm 2 register bytes in one transaction.
    pub async fn alarm2(&mut self) -> Result<[u8; 3], Error<I2C::Error>> {
        self.read_registers(Register::Alarm2).await
    }

    /// Programs Alarm 1 and returns the register bytes written.
    pub async fn set_alarm1(
        &mut self,
        alarm: &Alarm1,
        interrupt_enable: bool,
    ) -> Result<[u8; 4], Error<I2C::Error>> {
        let d = alarm.to_registers()?;
        self.i2c
            .write(
                self.address,
                &[Register::Alarm1 as u8, d[0], d[1], d[2], d[3]],
            )
            .await?;
        self.set_alarm_interrupt(interrupt_enable, InterruptTarget::Alarm1)
            .await?;
        self.check_and_clear_alarm(Alarm::One).await?;
        Ok(d)
    }

    /// Programs Alarm 2 and returns the register bytes written.
    pub async fn set_alarm2(
        &mut self,
        alarm: &Alarm2,
        interrupt_enable: bool,
    ) -> Result<[u8; 3], Error<I2C::Error>> {
        let d = alarm.to_registers()?;
        self.i2c
            .write(self.address, &[Register::Alarm2 as u8, d[0], d[1], d[2]])
            .await?;
        self.set_alarm_interrupt(interrupt_enable, InterruptTarget::Alarm2)
            .await?;
        self.check_and_clear_alarm(Alarm::Two).await?;
        Ok(d)
    }

    /// Sets or clears the interrupt enable for the targeted alarm(s) and
    /// returns the resulting control value. `Both` performs one independent
    /// read-modify-write cycle per alarm.
    pub async fn set_alarm_interrupt(
        &mut self,
        enable: bool,
        target: InterruptTarget,
    ) -> Result<Control, Error<I2C::Error>> {
        let mut control = Control::default();
        if matches!(target, InterruptTarget::Alarm1 | InterruptTarget::Both) {
            control = self.control().await?;
            control.set_alarm1_interrupt_enable(enable);
            if enable {
                control.set_interrupt_control(true);
            }
            self.set_control(control).await?;
        }
        if matches!(target, InterruptTarget::Alarm2 | InterruptTarget::Both) {
            control = self.control().await?;
            control.set_alarm2_interrupt_enable(enable);
            if enable {
                control.set_interrupt_control(true);
            }
            self.set_control(control).await?;
        }
        Ok(control)
    }

    /// Tests and clears the pending flag of one alarm; the other alarm's
    /// flag is never touched and a clean flag costs no status write.
    pub async fn check_and_clear_alarm(&mut self, alarm: Alarm) -> Result<bool, Error<I2C::Error>> {
        let mut status = self.status().await?;
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
        self.set_status(status).await?;
        Ok(true)
    }

    /// Enables or disables the 32.768 kHz output via read-modify-write of
    /// the status register.
    pub async fn set_32khz_output(&mut self, enable: bool) -> Result<(), Error<I2C::Error>> {
        let mut status = self.status().await?;
        status.set_enable_32khz_output(enable);
        self.set_status(status).await
    }

    /// Whether timekeeping was interrupted since the flag was last cleared.
    pub async fn oscillator_stopped(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.status().await?.oscillator_stop_flag())
    }

    /// Whether the device is busy with TCXO frequency trimming.
    pub async fn is_busy(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.status().await?.busy())
    }

    /// Reads the aging offset register.
    pub async fn aging_offset(&mut self) -> Result<i8, Error<I2C::Error>> {
        Ok(self.read_register(Register::AgingOffset).await? as i8)
    }

    /// Writes the aging offset register.
    pub async fn set_aging_offset(&mut self, offset: i8) -> Result<(), Error<I2C::Error>> {
        self.write_register(Register::AgingOffset, offset as u8).await
    }

    /// Reads the temperature registers in one 2-byte transaction.
    pub async fn temperature(&mut self) -> Result<Temperature, Error<I2C::Error>> {
        let data: [u8; 2] = self.read_registers(Register::Temperature).await?;
        Ok(Temperature::from_registers(data[0], data[1]))
    }

    async fn clear_oscillator_stop_flag(&mut self) -> Result<(), Error<I2C::Error>> {
        let mut status = self.status().await?;
        status.set_oscillator_stop_flag(false);
        self.set_status(status).await
    }
}
