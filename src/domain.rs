//! wire vocabulary shared by the loops: temperature scales, server commands,
//! and the text records written to the log and the socket.

use std::fmt;
use std::str::FromStr;

/// temperature unit a reading is reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Celsius,
    Fahrenheit,
}

impl Scale {
    /// single-letter form used on the wire and on the command line
    pub fn letter(self) -> char {
        match self {
            Scale::Celsius => 'C',
            Scale::Fahrenheit => 'F',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'C' => Some(Scale::Celsius),
            'F' => Some(Scale::Fahrenheit),
            _ => None,
        }
    }

    /// compact encoding for atomic storage
    pub fn to_u8(self) -> u8 {
        self.letter() as u8
    }

    pub fn from_u8(b: u8) -> Option<Self> {
        Self::from_letter(b as char)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Scale::from_letter(c).ok_or_else(|| format!("unknown scale '{}', expected C or F", s)),
            _ => Err(format!("unknown scale '{}', expected C or F", s)),
        }
    }
}

/// a control line received from the server, after parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Off,
    Stop,
    Start,
    Scale(Scale),
    Period(u64),
    /// a known keyword with an argument we refuse to apply
    Rejected(&'static str),
    Unknown,
}

impl Command {
    /// parse one line (without its newline terminator)
    ///
    /// OFF / STOP / START must match exactly. SCALE= is exactly seven
    /// characters. PERIOD= is a prefix match whose argument must be a
    /// positive integer; anything else leaves the period alone.
    pub fn parse(line: &str) -> Self {
        match line {
            "OFF" => return Command::Off,
            "STOP" => return Command::Stop,
            "START" => return Command::Start,
            _ => {}
        }

        if let Some(arg) = line.strip_prefix("SCALE=") {
            if line.len() != 7 {
                return Command::Unknown;
            }
            return match arg.chars().next().and_then(Scale::from_letter) {
                Some(scale) => Command::Scale(scale),
                None => Command::Rejected("scale must be C or F"),
            };
        }

        if let Some(arg) = line.strip_prefix("PERIOD=") {
            return match arg.trim().parse::<i64>() {
                Ok(n) if n >= 1 => Command::Period(n as u64),
                Ok(_) => Command::Rejected("period must be at least 1 second"),
                Err(_) => Command::Rejected("period is not an integer"),
            };
        }

        Command::Unknown
    }
}

// ==============================================================================
// records
// ==============================================================================
// every record is one newline-terminated ascii line. readings, the identity
// line, and the shutdown sentinel go to both sinks; command echoes go to the
// log only.

/// local wall-clock time, 24-hour, zero padded
pub fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

pub fn reading_record(timestamp: &str, temperature: f64) -> String {
    format!("{} {:.1}\n", timestamp, temperature)
}

pub fn shutdown_record(timestamp: &str) -> String {
    format!("{} SHUTDOWN\n", timestamp)
}

pub fn identity_record(id: &str) -> String {
    format!("ID={}\n", id)
}

/// the received line as-is, even if it is not valid utf-8
pub fn echo_record(line: &[u8]) -> Vec<u8> {
    let mut record = Vec::with_capacity(line.len() + 1);
    record.extend_from_slice(line);
    record.push(b'\n');
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_keywords() {
        assert_eq!(Command::parse("OFF"), Command::Off);
        assert_eq!(Command::parse("STOP"), Command::Stop);
        assert_eq!(Command::parse("START"), Command::Start);
        assert_eq!(Command::parse("OFFX"), Command::Unknown);
        assert_eq!(Command::parse("start"), Command::Unknown);
        assert_eq!(Command::parse(" STOP"), Command::Unknown);
    }

    #[test]
    fn test_scale_command() {
        assert_eq!(Command::parse("SCALE=C"), Command::Scale(Scale::Celsius));
        assert_eq!(Command::parse("SCALE=F"), Command::Scale(Scale::Fahrenheit));
        assert!(matches!(Command::parse("SCALE=X"), Command::Rejected(_)));
        // wrong length is not a scale command at all
        assert_eq!(Command::parse("SCALE=CC"), Command::Unknown);
        assert_eq!(Command::parse("SCALE="), Command::Unknown);
    }

    #[test]
    fn test_period_command() {
        assert_eq!(Command::parse("PERIOD=2"), Command::Period(2));
        assert_eq!(Command::parse("PERIOD=60"), Command::Period(60));
        assert!(matches!(Command::parse("PERIOD=0"), Command::Rejected(_)));
        assert!(matches!(Command::parse("PERIOD=-5"), Command::Rejected(_)));
        assert!(matches!(Command::parse("PERIOD=abc"), Command::Rejected(_)));
        assert!(matches!(Command::parse("PERIOD="), Command::Rejected(_)));
    }

    #[test]
    fn test_scale_from_str() {
        assert_eq!("C".parse::<Scale>().unwrap(), Scale::Celsius);
        assert_eq!("F".parse::<Scale>().unwrap(), Scale::Fahrenheit);
        assert!("K".parse::<Scale>().is_err());
        assert!("CF".parse::<Scale>().is_err());
        assert!("".parse::<Scale>().is_err());
    }

    #[test]
    fn test_scale_byte_encoding() {
        for scale in [Scale::Celsius, Scale::Fahrenheit] {
            assert_eq!(Scale::from_u8(scale.to_u8()), Some(scale));
        }
        assert_eq!(Scale::from_u8(b'K'), None);
    }

    #[test]
    fn test_record_formats() {
        assert_eq!(reading_record("09:05:01", 77.0), "09:05:01 77.0\n");
        assert_eq!(reading_record("23:59:59", 25.04), "23:59:59 25.0\n");
        assert_eq!(shutdown_record("12:00:00"), "12:00:00 SHUTDOWN\n");
        assert_eq!(identity_record("123456789"), "ID=123456789\n");
        assert_eq!(echo_record(b"PERIOD=3"), b"PERIOD=3\n");
        assert_eq!(echo_record(b"HI\xff"), b"HI\xff\n");
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = timestamp();
        assert_eq!(ts.len(), 8);
        let bytes = ts.as_bytes();
        assert_eq!(bytes[2], b':');
        assert_eq!(bytes[5], b':');
        assert!(ts.chars().filter(|c| *c != ':').all(|c| c.is_ascii_digit()));
    }
}
