use core::fmt;

/// Association identifier, assigned by the AP when a station associates.
/// Only the low 12 bits are meaningful on air (AID12).
pub type Aid = u16;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Convenience constructor for locally administered test/sim addresses.
    /// The low two bytes carry `id`.
    pub fn local(id: u16) -> Self {
        let [hi, lo] = id.to_be_bytes();
        Self([0x02, 0x00, 0x00, 0x00, hi, lo])
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", b[0], b[1], b[2], b[3], b[4], b[5])
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A station as known to the association directory
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StaHandle {
    pub addr: MacAddr,
    pub aid: Aid,
}

impl fmt::Display for StaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/aid{}", self.addr, self.aid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_addr_display() {
        let a = MacAddr::local(0x0102);
        assert_eq!(a.to_string(), "02:00:00:00:01:02");
    }

    #[test]
    fn test_local_addr_ordering_follows_id() {
        assert!(MacAddr::local(1) < MacAddr::local(2));
        assert!(MacAddr::local(255) < MacAddr::local(256));
    }
}
