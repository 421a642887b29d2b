//! RIOT RAM shared between the decoder and cartridge logic
//!
//! The 6532 holds the console's only 128 bytes of RAM. The bus decoder serves
//! it at $80-$FF (and mirrors), and a few cartridge schemes watch the same
//! bytes go by: Activision FE boards pick their bank from the return address
//! the 6507 pushes onto the stack at $01FE/$01FF. There is one buffer and both
//! sides look at it, so a write is visible to every reader immediately.

use serde::{Deserialize, Serialize};

pub const RIOT_RAM_SIZE: usize = 128;

mod serde_arrays {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::RIOT_RAM_SIZE;

    pub fn serialize<S>(arr: &[u8; RIOT_RAM_SIZE], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        arr.as_slice().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; RIOT_RAM_SIZE], D::Error>
    where
        D: Deserializer<'de>,
    {
        let vec = Vec::<u8>::deserialize(deserializer)?;
        vec.try_into().map_err(|v: Vec<u8>| {
            serde::de::Error::invalid_length(v.len(), &"128 bytes of RIOT RAM")
        })
    }
}

/// 128 bytes of RIOT RAM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedIoRam {
    #[serde(with = "serde_arrays")]
    bytes: [u8; RIOT_RAM_SIZE],
}

impl Default for SharedIoRam {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedIoRam {
    pub fn new() -> Self {
        Self {
            bytes: [0; RIOT_RAM_SIZE],
        }
    }

    /// Read through any mirror; only A0-A6 select the byte
    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[(addr & 0x7F) as usize]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, val: u8) {
        self.bytes[(addr & 0x7F) as usize] = val;
    }

    pub fn clear(&mut self) {
        self.bytes = [0; RIOT_RAM_SIZE];
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirrors_share_storage() {
        let mut ram = SharedIoRam::new();

        ram.write(0x0080, 0x42);
        assert_eq!(ram.read(0x0180), 0x42);
        assert_eq!(ram.read(0x0480), 0x42);

        // Stack page alias
        ram.write(0x01FF, 0x99);
        assert_eq!(ram.read(0x00FF), 0x99);
    }

    #[test]
    fn test_last_writer_wins() {
        let mut ram = SharedIoRam::new();
        ram.write(0x00FE, 0x01);
        ram.write(0x01FE, 0x02);
        assert_eq!(ram.read(0x00FE), 0x02);
    }

    #[test]
    fn test_clear() {
        let mut ram = SharedIoRam::new();
        ram.write(0x0085, 0x12);
        ram.clear();
        assert!(ram.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_state_rejects_wrong_length() {
        let mut ram = SharedIoRam::new();
        ram.write(0x0081, 0x7E);

        let json = serde_json::to_value(&ram).expect("serialize");
        let restored: SharedIoRam = serde_json::from_value(json).expect("deserialize");
        assert_eq!(restored, ram);

        let short = serde_json::json!({ "bytes": [1, 2, 3] });
        assert!(serde_json::from_value::<SharedIoRam>(short).is_err());
    }
}
