//! Register map and bit layouts for the DS3231.
//!
//! The device exposes a flat 19-byte register space. Multi-byte blocks
//! (clock, alarms, temperature) are always transferred in a single bus
//! transaction starting at the block's base address; the control and status
//! registers are read-modify-write targets.

use bitfield::bitfield;

/// Base addresses of the register blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Clock block: seconds, minutes, hours, weekday, day, month, year (7 bytes)
    DateTime = 0x00,
    /// Alarm 1 block: seconds, minutes, hours, day/date (4 bytes)
    Alarm1 = 0x07,
    /// Alarm 2 block: minutes, hours, day/date (3 bytes)
    Alarm2 = 0x0B,
    /// Control register (1 byte)
    Control = 0x0E,
    /// Status register (1 byte)
    Status = 0x0F,
    /// Aging offset register (1 byte, signed)
    AgingOffset = 0x10,
    /// Temperature block: integer part, fraction (2 bytes)
    Temperature = 0x11,
}

/// Hour registers, bit 6: 12-hour mode when set, 24-hour when clear.
pub(crate) const HOUR_MODE_12H: u8 = 1 << 6;
/// Hour registers, bit 5: PM flag, only meaningful in 12-hour mode.
pub(crate) const HOUR_PM: u8 = 1 << 5;
/// Month register, bit 7: century flag. Ignored on decode, written as 0.
pub(crate) const MONTH_CENTURY: u8 = 1 << 7;
/// Alarm day/date registers, bit 6: compare the weekday instead of the date.
pub(crate) const ALARM_WEEKDAY: u8 = 1 << 6;

/// Square-wave output selection for the INT/SQW pin.
///
/// `Disable` silences the periodic output and routes the pin to the alarm
/// interrupt function instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWave {
    /// No periodic output; pin follows the alarm interrupt function
    Disable,
    /// 1 Hz square wave
    Hz1,
    /// 1.024 kHz square wave
    Hz1024,
    /// 4.096 kHz square wave
    Hz4096,
    /// 8.192 kHz square wave
    Hz8192,
}

impl SquareWave {
    /// Value of the RS2:RS1 frequency-select bits, `None` for `Disable`.
    pub(crate) fn rate_select(self) -> Option<u8> {
        match self {
            SquareWave::Disable => None,
            SquareWave::Hz1 => Some(0b00),
            SquareWave::Hz1024 => Some(0b01),
            SquareWave::Hz4096 => Some(0b10),
            SquareWave::Hz8192 => Some(0b11),
        }
    }
}

// Generates From<u8> and From<$typ> for u8 for a bitfield register type.
macro_rules! register_byte {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Control register (0x0E).
    ///
    /// Every mutating operation that touches this register reads it first
    /// and writes back the full byte so unrelated bits survive.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control(u8);
    impl Debug;
    /// Oscillator disabled on battery power when set (EOSC)
    pub oscillator_disable, set_oscillator_disable: 7;
    /// Square wave output on battery power (BBSQW)
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    /// Force a temperature conversion (CONV)
    pub convert_temperature, set_convert_temperature: 5;
    /// Square wave frequency select (RS2:RS1)
    pub square_wave_frequency, set_square_wave_frequency: 4, 3;
    /// Pin function: alarm interrupt when set, square wave when clear (INTCN)
    pub interrupt_control, set_interrupt_control: 2;
    /// Alarm 2 interrupt enable (A2IE)
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    /// Alarm 1 interrupt enable (A1IE)
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
register_byte!(Control);

#[cfg(feature = "defmt")]
impl defmt::Format for Control {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Control(EOSC={} BBSQW={} CONV={} RS={} INTCN={} A2IE={} A1IE={})",
            self.oscillator_disable(),
            self.battery_backed_square_wave(),
            self.convert_temperature(),
            self.square_wave_frequency(),
            self.interrupt_control(),
            self.alarm2_interrupt_enable(),
            self.alarm1_interrupt_enable(),
        );
    }
}

bitfield! {
    /// Status register (0x0F).
    ///
    /// Flags are cleared only by writing the register back with the flag bit
    /// zeroed, never implicitly by a read.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    /// Oscillator stop flag: timekeeping was interrupted (OSF)
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// 32.768 kHz output enable (EN32kHz)
    pub enable_32khz_output, set_enable_32khz_output: 3;
    /// Busy with TCXO frequency trimming (BSY)
    pub busy, set_busy: 2;
    /// Alarm 2 match pending (A2F)
    pub alarm2_flag, set_alarm2_flag: 1;
    /// Alarm 1 match pending (A1F)
    pub alarm1_flag, set_alarm1_flag: 0;
}
register_byte!(Status);

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Status(OSF={} EN32kHz={} BSY={} A2F={} A1F={})",
            self.oscillator_stop_flag(),
            self.enable_32khz_output(),
            self.busy(),
            self.alarm2_flag(),
            self.alarm1_flag(),
        );
    }
}

/// Temperature reading from the on-chip sensor, 0.25 °C resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature(i16);

impl Temperature {
    /// Builds a reading from the raw MSB/LSB register pair. The value is a
    /// 10-bit two's-complement quantity; the fraction sits in the top two
    /// bits of the LSB.
    pub(crate) fn from_registers(msb: u8, lsb: u8) -> Self {
        Temperature((i16::from(msb as i8) << 2) | i16::from(lsb >> 6))
    }

    /// Temperature in quarter-degree Celsius steps.
    #[must_use]
    pub fn quarter_degrees(self) -> i16 {
        self.0
    }

    /// Whole degrees Celsius, truncated toward zero.
    #[must_use]
    pub fn degrees(self) -> i8 {
        (self.0 / 4) as i8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_bit_positions() {
        let control = Control::from(0b0001_1100);
        assert_eq!(control.square_wave_frequency(), 0b11);
        assert!(control.interrupt_control());
        assert!(!control.alarm1_interrupt_enable());
        assert!(!control.alarm2_interrupt_enable());
        assert_eq!(u8::from(control), 0b0001_1100);

        let mut control = Control::default();
        control.set_alarm1_interrupt_enable(true);
        control.set_alarm2_interrupt_enable(true);
        control.set_interrupt_control(true);
        assert_eq!(u8::from(control), 0b0000_0111);
    }

    #[test]
    fn status_bit_positions() {
        let status = Status::from(0x8F);
        assert!(status.oscillator_stop_flag());
        assert!(status.enable_32khz_output());
        assert!(status.busy());
        assert!(status.alarm2_flag());
        assert!(status.alarm1_flag());

        let mut status = Status::from(0x00);
        status.set_enable_32khz_output(true);
        assert_eq!(u8::from(status), 0b0000_1000);
    }

    #[test]
    fn control_status_preserve_unknown_bits() {
        // Round-tripping through the wrapper must not disturb any bit.
        for value in [0x00u8, 0x55, 0xAA, 0xFF, 0x1C, 0x83] {
            assert_eq!(u8::from(Control::from(value)), value);
            assert_eq!(u8::from(Status::from(value)), value);
        }
    }

    #[test]
    fn square_wave_rate_select_bits() {
        assert_eq!(SquareWave::Disable.rate_select(), None);
        assert_eq!(SquareWave::Hz1.rate_select(), Some(0b00));
        assert_eq!(SquareWave::Hz1024.rate_select(), Some(0b01));
        assert_eq!(SquareWave::Hz4096.rate_select(), Some(0b10));
        assert_eq!(SquareWave::Hz8192.rate_select(), Some(0b11));
    }

    #[test]
    fn temperature_decoding() {
        let t = Temperature::from_registers(0x19, 0x40); // 25.25 °C
        assert_eq!(t.degrees(), 25);
        assert_eq!(t.quarter_degrees(), 101);

        let t = Temperature::from_registers(0x00, 0x00);
        assert_eq!(t.degrees(), 0);
        assert_eq!(t.quarter_degrees(), 0);

        let t = Temperature::from_registers(0xF6, 0x80); // -10 °C + 0.50 °C
        assert_eq!(t.quarter_degrees(), -38);
        assert_eq!(t.degrees(), -9);
    }
}
