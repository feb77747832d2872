//! Format, codec and layout tags

/// Output sample type (signed 16-bit PCM)
pub type Sample = i16;

/// Decode routine family used by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodingType {
    /// Little-endian 16-bit PCM, one channel per cursor
    Pcm16Le,
    /// Big-endian 16-bit PCM, one channel per cursor
    Pcm16Be,
    /// Little-endian 16-bit PCM, channels interleaved every sample
    Pcm16LeInt,
    /// Signed 8-bit PCM
    Pcm8,
    /// Unsigned 8-bit PCM, channels interleaved every sample
    Pcm8UInt,
    /// Nintendo DSP 4-bit ADPCM
    NgcDsp,
    /// Nintendo AFC 4-bit ADPCM
    NgcAfc,
    /// PlayStation 4-bit ADPCM
    Psx,
    /// PlayStation 4-bit ADPCM ignoring frame flags
    PsxBadflags,
    /// CRI ADX 4-bit ADPCM
    CriAdx,
    /// IMA ADPCM, low nibble first
    Ima,
    /// Intel DVI IMA ADPCM, high nibble first
    DviIma,
    /// Ogg Vorbis through an external decoder
    OggVorbis,
}

impl CodingType {
    /// Human-readable name
    pub fn description(self) -> &'static str {
        match self {
            CodingType::Pcm16Le => "Little Endian 16-bit PCM",
            CodingType::Pcm16Be => "Big Endian 16-bit PCM",
            CodingType::Pcm16LeInt => "Little Endian 16-bit PCM with 2 byte interleave",
            CodingType::Pcm8 => "8-bit PCM",
            CodingType::Pcm8UInt => "8-bit unsigned PCM with 1 byte interleave",
            CodingType::NgcDsp => "Gamecube \"DSP\" 4-bit ADPCM",
            CodingType::NgcAfc => "Gamecube \"AFC\" 4-bit ADPCM",
            CodingType::Psx => "Playstation 4-bit ADPCM",
            CodingType::PsxBadflags => "Playstation 4-bit ADPCM with bad flags",
            CodingType::CriAdx => "CRI ADX 4-bit ADPCM",
            CodingType::Ima => "4-bit IMA ADPCM",
            CodingType::DviIma => "Intel DVI 4-bit IMA ADPCM",
            CodingType::OggVorbis => "Vorbis",
        }
    }

    /// Samples produced by one codec frame
    pub fn samples_per_frame(self) -> usize {
        match self {
            CodingType::Pcm16Le
            | CodingType::Pcm16Be
            | CodingType::Pcm16LeInt
            | CodingType::Pcm8
            | CodingType::Pcm8UInt
            | CodingType::Ima
            | CodingType::DviIma
            | CodingType::OggVorbis => 1,
            CodingType::NgcDsp => 14,
            CodingType::NgcAfc => 16,
            CodingType::Psx | CodingType::PsxBadflags => 28,
            CodingType::CriAdx => 32,
        }
    }

    /// Bytes in one codec frame for a single channel.
    ///
    /// Zero means the codec is not byte-framed: 4-bit codecs store two
    /// samples per byte and external decoders manage their own framing.
    pub fn frame_size(self) -> usize {
        match self {
            CodingType::Pcm16Le | CodingType::Pcm16Be | CodingType::Pcm16LeInt => 2,
            CodingType::Pcm8 | CodingType::Pcm8UInt => 1,
            CodingType::NgcDsp => 8,
            CodingType::NgcAfc => 9,
            CodingType::Psx | CodingType::PsxBadflags => 16,
            CodingType::CriAdx => 18,
            CodingType::Ima | CodingType::DviIma | CodingType::OggVorbis => 0,
        }
    }

    /// Number of samples held by `bytes` bytes of one channel
    pub fn samples_in_bytes(self, bytes: usize) -> usize {
        match self.frame_size() {
            0 => bytes * 2 * self.samples_per_frame(),
            frame_size => bytes / frame_size * self.samples_per_frame(),
        }
    }
}

/// Block-based layout variants, each with its own block header parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockedLayout {
    /// Nintendo AST `BLCK` chunks
    Ast,
    /// HAL Laboratory HALPST block chain
    Halpst,
}

/// Strategy for locating successive blocks of data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutType {
    /// The whole stream is one block
    None,
    /// Fixed-size per-channel blocks
    Interleave,
    /// Fixed-size per-channel blocks with a shorter final block
    InterleaveShortblock,
    /// Blocks carrying their own headers
    Blocked(BlockedLayout),
    /// Concatenation of nested sessions
    Segmented,
}

impl LayoutType {
    /// Human-readable name
    pub fn description(self) -> &'static str {
        match self {
            LayoutType::None => "flat (no layout)",
            LayoutType::Interleave => "interleave",
            LayoutType::InterleaveShortblock => "interleave with short last block",
            LayoutType::Blocked(BlockedLayout::Ast) => "AST blocked",
            LayoutType::Blocked(BlockedLayout::Halpst) => "HALPST blocked",
            LayoutType::Segmented => "segmented",
        }
    }

    /// True for the fixed-interleave strategies
    pub fn is_interleave(self) -> bool {
        matches!(self, LayoutType::Interleave | LayoutType::InterleaveShortblock)
    }
}

/// Header parser that built a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaType {
    /// CRI ADX, header type 03
    Adx03,
    /// CRI ADX, header type 04
    Adx04,
    /// Nintendo RSTM
    Rstm,
    /// Nintendo AST
    Ast,
    /// HAL Laboratory HALPST
    Halpst,
    /// Standard Nintendo DSP
    DspStd,
    /// Sony VAG (VAGp)
    Ps2VagP,
    /// RIFF WAVE
    RiffWave,
    /// RIFF WAVE with a `smpl` loop
    RiffWaveSmpl,
    /// Ogg Vorbis
    OggVorbis,
    /// GENH generic header
    Genh,
    /// Text playlist of segment files
    Txtp,
    /// Headerless PCM picked by extension
    Raw,
}

impl MetaType {
    /// Human-readable name
    pub fn description(self) -> &'static str {
        match self {
            MetaType::Adx03 => "CRI ADX header type 03",
            MetaType::Adx04 => "CRI ADX header type 04",
            MetaType::Rstm => "Nintendo RSTM header",
            MetaType::Ast => "Nintendo AST header",
            MetaType::Halpst => "HAL Laboratory HALPST header",
            MetaType::DspStd => "Standard Nintendo DSP header",
            MetaType::Ps2VagP => "Sony VAG Mono header (VAGp)",
            MetaType::RiffWave => "RIFF WAVE header",
            MetaType::RiffWaveSmpl => "RIFF WAVE header with sample looping info",
            MetaType::OggVorbis => "Ogg Vorbis",
            MetaType::Genh => "GENH Generic Header",
            MetaType::Txtp => "TXTP segment playlist",
            MetaType::Raw => "assumed RAW PCM file by .raw extension",
        }
    }
}
