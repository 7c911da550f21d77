use core::ops::{Index, IndexMut};

/// The six argument words of one mailbox request or response.
///
/// Each word is a `u32` on the wire; firmware also uses some of them as
/// IEEE-754 singles, hence the `f32` accessors.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct RequestArgs([u32; WORDS]);

const WORDS: usize = 6;

impl RequestArgs {
    pub const WORDS: usize = WORDS;

    /// Size of the serialized block.
    pub const SIZE: usize = Self::WORDS * 4;

    #[inline]
    #[must_use]
    pub const fn new(words: [u32; Self::WORDS]) -> Self {
        Self(words)
    }

    #[inline]
    #[must_use]
    pub const fn zeroed() -> Self {
        Self([0; Self::WORDS])
    }

    /// All zero except the first word.
    #[inline]
    #[must_use]
    pub const fn with_arg0(value: u32) -> Self {
        let mut words = [0; Self::WORDS];
        words[0] = value;
        Self(words)
    }

    #[inline]
    #[must_use]
    pub const fn words(&self) -> &[u32; Self::WORDS] {
        &self.0
    }

    #[inline]
    #[must_use]
    pub const fn into_words(self) -> [u32; Self::WORDS] {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn arg0(&self) -> u32 {
        self.0[0]
    }

    #[inline]
    #[must_use]
    pub const fn arg1(&self) -> u32 {
        self.0[1]
    }

    #[inline]
    #[must_use]
    pub const fn f32(&self, index: usize) -> f32 {
        f32::from_bits(self.0[index])
    }

    #[inline]
    pub const fn set_f32(&mut self, index: usize, value: f32) {
        self.0[index] = value.to_bits();
    }

    /// Little-endian serialization, word 0 first.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.0) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    #[must_use]
    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        let mut words = [0u32; Self::WORDS];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self(words)
    }

    /// Parses a block of exactly [`SIZE`](Self::SIZE) bytes.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; Self::SIZE] = bytes.try_into().ok()?;
        Some(Self::from_bytes(bytes))
    }
}

impl From<[u32; WORDS]> for RequestArgs {
    #[inline]
    fn from(words: [u32; WORDS]) -> Self {
        Self(words)
    }
}

impl Index<usize> for RequestArgs {
    type Output = u32;

    #[inline]
    fn index(&self, index: usize) -> &u32 {
        &self.0[index]
    }
}

impl IndexMut<usize> for RequestArgs {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut u32 {
        &mut self.0[index]
    }
}
