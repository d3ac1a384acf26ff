//! # Header Bit Fields
//!
//! Every field of the 32-bit DMA info word, as a const [`BitField`].
//!
//! Ranges are checked when the constants are evaluated, so a typo such as
//! `BitField::new(27, 35)` fails to compile instead of producing a bad mask.
//!
//! ## Layout
//! ```text
//! TX packet   [31:30 TYPE][29:27 D_PORT][26:25 QSEL][24 WIV][21 CSO][20 TSO][19 802.11][17 BURST][16 NEXT_VLD][15:0 LEN]
//! TX command  [31:30 TYPE][29:27 D_PORT][26:20 CMD_TYPE][19:16 SEQ][15:0 LEN]
//! RX packet   [31:30 TYPE][29:27 PORT][26:25 QSEL][24 PCIE_INTR][23:21 MAC_LEN][20 L3L4][19 802.11][18 IP][17 TCP][16 UDP][13:0 LEN]
//! RX event    [31:30 TYPE][29:27 PORT][26:25 QSEL][24 PCIE_INTR][23:20 EVT_TYPE][19:16 SEQ][15 SELF_GEN][13:0 LEN]
//! ```

/// Contiguous run of bits `lo..=hi` inside a `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    lo: u32,
    hi: u32,
}

impl BitField {
    /// Field covering bits `lo..=hi`.
    pub const fn new(lo: u32, hi: u32) -> Self {
        assert!(lo <= hi, "bit field range is inverted");
        assert!(hi < 32, "bit field exceeds 32 bits");
        Self { lo, hi }
    }

    /// Single-bit field.
    pub const fn bit(n: u32) -> Self {
        Self::new(n, n)
    }

    pub const fn width(self) -> u32 {
        self.hi - self.lo + 1
    }

    /// Largest value the field can hold.
    pub const fn max(self) -> u32 {
        if self.width() == 32 {
            u32::MAX
        } else {
            (1u32 << self.width()) - 1
        }
    }

    /// Mask of the field in word position.
    pub const fn mask(self) -> u32 {
        self.max() << self.lo
    }

    /// Extract the field from `word`.
    #[inline]
    pub const fn get(self, word: u32) -> u32 {
        (word & self.mask()) >> self.lo
    }

    /// Place `value` at the field position. Bits above the width are dropped.
    #[inline]
    pub const fn set(self, value: u32) -> u32 {
        (value & self.max()) << self.lo
    }

    #[inline]
    pub const fn is_set(self, word: u32) -> bool {
        self.get(word) != 0
    }

    #[inline]
    pub const fn flag(self, on: bool) -> u32 {
        if on {
            self.mask()
        } else {
            0
        }
    }
}

/// Size of the info word in front of every frame.
pub const DMA_HDR_LEN: usize = 4;

/// Trailer the device expects after each frame, also the minimum pad.
pub const DMA_TRAILER_LEN: usize = 4;

/// Round `len` up to the next multiple of 4.
#[inline]
pub const fn round_up4(len: usize) -> usize {
    (len + 3) & !3
}

/// Fields shared by both directions.
pub mod common {
    use super::BitField;

    pub const PORT: BitField = BitField::new(27, 29);
    pub const TYPE: BitField = BitField::new(30, 31);
}

/// Host to device.
pub mod tx {
    use super::BitField;

    pub const LEN: BitField = BitField::new(0, 15);
    pub const D_PORT: BitField = super::common::PORT;
    pub const TYPE: BitField = super::common::TYPE;

    pub mod pkt {
        use super::BitField;

        pub const NEXT_VLD: BitField = BitField::bit(16);
        pub const TX_BURST: BitField = BitField::bit(17);
        pub const IS_80211: BitField = BitField::bit(19);
        pub const TSO: BitField = BitField::bit(20);
        pub const CSO: BitField = BitField::bit(21);
        pub const WIV: BitField = BitField::bit(24);
        pub const QSEL: BitField = BitField::new(25, 26);
    }

    pub mod cmd {
        use super::BitField;

        pub const SEQ: BitField = BitField::new(16, 19);
        pub const TYPE: BitField = BitField::new(20, 26);
    }
}

/// Device to host.
pub mod rx {
    use super::BitField;

    pub const LEN: BitField = BitField::new(0, 13);
    pub const PCIE_INTR: BitField = BitField::bit(24);
    pub const QSEL: BitField = BitField::new(25, 26);
    pub const PORT: BitField = super::common::PORT;
    pub const TYPE: BitField = super::common::TYPE;

    pub mod pkt {
        use super::BitField;

        pub const UDP_ERR: BitField = BitField::bit(16);
        pub const TCP_ERR: BitField = BitField::bit(17);
        pub const IP_ERR: BitField = BitField::bit(18);
        pub const PKT_80211: BitField = BitField::bit(19);
        pub const L3L4_DONE: BitField = BitField::bit(20);
        pub const MAC_LEN: BitField = BitField::new(21, 23);
    }

    pub mod cmd {
        use super::BitField;

        pub const SELF_GEN: BitField = BitField::bit(15);
        pub const CMD_SEQ: BitField = BitField::new(16, 19);
        pub const EVT_TYPE: BitField = BitField::new(20, 23);
    }
}
