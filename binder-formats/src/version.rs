//! Format generations
//!
//! The targeted games span several revisions of the same container
//! family. The generation decides the hash bit width, the data-file
//! magic and the entry record shape inside BHD5 headers.

/// A game generation, ordered by release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GameVersion {
    DemonsSouls,
    DarkSouls1,
    DarkSouls2,
    DarkSouls3,
    Sekiro,
    EldenRing,
}

impl GameVersion {
    /// Path hashes are 64-bit from Elden Ring on, 32-bit before.
    pub fn uses_64bit_hashes(self) -> bool {
        self >= GameVersion::EldenRing
    }

    /// Magic of the matching data file's 16-byte prelude.
    pub fn data_magic(self) -> &'static [u8; 4] {
        if self >= GameVersion::DarkSouls2 {
            b"BDF4"
        } else {
            b"BDF3"
        }
    }

    /// Headers carry a salt section from Dark Souls 2 on.
    pub fn has_salt(self) -> bool {
        self >= GameVersion::DarkSouls2
    }

    /// Entries carry SHA/AES record offsets from Dark Souls 2 on.
    pub fn has_entry_records(self) -> bool {
        self >= GameVersion::DarkSouls2
    }

    /// Entries carry an explicit unpadded size from Dark Souls 3 on.
    pub fn has_unpadded_size(self) -> bool {
        self >= GameVersion::DarkSouls3
    }
}

impl std::fmt::Display for GameVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GameVersion::DemonsSouls => "DemonsSouls",
            GameVersion::DarkSouls1 => "DarkSouls1",
            GameVersion::DarkSouls2 => "DarkSouls2",
            GameVersion::DarkSouls3 => "DarkSouls3",
            GameVersion::Sekiro => "Sekiro",
            GameVersion::EldenRing => "EldenRing",
        };
        f.write_str(name)
    }
}
