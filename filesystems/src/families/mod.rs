// Filesystem Families Organization
// FAT is the only family; FAT12 is the only variant read.

pub mod fat;
