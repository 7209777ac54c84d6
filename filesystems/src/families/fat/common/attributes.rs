/// Directory entry attribute byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatAttributes(pub u8);

impl FatAttributes {
    pub const READ_ONLY: u8 = 0x01;
    pub const HIDDEN: u8 = 0x02;
    pub const SYSTEM: u8 = 0x04;
    pub const VOLUME_ID: u8 = 0x08;
    pub const DIRECTORY: u8 = 0x10;
    pub const ARCHIVE: u8 = 0x20;
    pub const LFN: u8 = 0x0F;  // Long filename entry

    pub fn is_read_only(&self) -> bool { self.0 & Self::READ_ONLY != 0 }
    pub fn is_hidden(&self) -> bool { self.0 & Self::HIDDEN != 0 }
    pub fn is_system(&self) -> bool { self.0 & Self::SYSTEM != 0 }
    pub fn is_volume_id(&self) -> bool { self.0 & Self::VOLUME_ID != 0 }
    pub fn is_directory(&self) -> bool { self.0 & Self::DIRECTORY != 0 }
    pub fn is_archive(&self) -> bool { self.0 & Self::ARCHIVE != 0 }
    pub fn is_lfn(&self) -> bool { self.0 & Self::LFN == Self::LFN }
}

impl std::fmt::Display for FatAttributes {
    /// Renders as `RHSVDA` with `-` for unset flags.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flags = [
            (self.is_read_only(), 'R'),
            (self.is_hidden(), 'H'),
            (self.is_system(), 'S'),
            (self.is_volume_id(), 'V'),
            (self.is_directory(), 'D'),
            (self.is_archive(), 'A'),
        ];
        for (set, c) in flags {
            write!(f, "{}", if set { c } else { '-' })?;
        }
        Ok(())
    }
}
