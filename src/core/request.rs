use std::fmt;

/// Visual-style preset selecting the style sentence of the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Naturaleza,
    Spot,
    Corporativo,
    Caribe,
    #[default]
    Publicitario,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Naturaleza,
        Mode::Spot,
        Mode::Corporativo,
        Mode::Caribe,
        Mode::Publicitario,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Naturaleza => "naturaleza",
            Mode::Spot => "spot",
            Mode::Corporativo => "corporativo",
            Mode::Caribe => "caribe",
            Mode::Publicitario => "publicitario",
        }
    }

    /// Matches an already lowercased token.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sku {
    #[default]
    Ml600,
    Ml335,
}

impl Sku {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sku::Ml600 => "600ml",
            Sku::Ml335 => "335ml",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "600ml" => Some(Sku::Ml600),
            "335ml" => Some(Sku::Ml335),
            _ => None,
        }
    }

    /// Only the 600ml bottle has a capless asset.
    pub fn requires_cap(&self) -> bool {
        matches!(self, Sku::Ml335)
    }
}

/// Aspect ratios accepted by the edit endpoint, matched case-sensitively.
pub const ASPECT_RATIOS: [&str; 11] = [
    "auto", "21:9", "16:9", "3:2", "4:3", "5:4", "1:1", "4:5", "3:4", "2:3", "9:16",
];

pub const DEFAULT_ASPECT_RATIO: &str = "9:16";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio(&'static str);

impl AspectRatio {
    pub fn parse(value: &str) -> Option<Self> {
        ASPECT_RATIOS
            .iter()
            .find(|ratio| **ratio == value)
            .copied()
            .map(AspectRatio)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio(DEFAULT_ASPECT_RATIO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    OneK,
    TwoK,
    FourK,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::OneK => "1K",
            Resolution::TwoK => "2K",
            Resolution::FourK => "4K",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "1K" => Some(Resolution::OneK),
            "2K" => Some(Resolution::TwoK),
            "4K" => Some(Resolution::FourK),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "png" => Some(OutputFormat::Png),
            "jpeg" | "jpg" => Some(OutputFormat::Jpeg),
            "webp" => Some(OutputFormat::Webp),
            _ => None,
        }
    }
}

/// fal safety tolerance, "1" (strict) through "6" (permissive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyTolerance(u8);

impl SafetyTolerance {
    pub fn new(level: u8) -> Option<Self> {
        (1..=6).contains(&level).then_some(SafetyTolerance(level))
    }

    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for SafetyTolerance {
    fn default() -> Self {
        SafetyTolerance(4)
    }
}

impl fmt::Display for SafetyTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully defaulted, type-safe generation request.
///
/// Only [`crate::core::sanitize::sanitize`] builds these from client input,
/// so `sku == 335ml` always comes with `has_cap == true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub mode: Mode,
    pub scene: Option<String>,
    pub sku: Sku,
    pub has_cap: bool,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
    pub output_format: OutputFormat,
    pub safety_tolerance: SafetyTolerance,
    pub reference_image_url: Option<String>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            scene: None,
            sku: Sku::default(),
            has_cap: true,
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
            output_format: OutputFormat::default(),
            safety_tolerance: SafetyTolerance::default(),
            reference_image_url: None,
        }
    }
}

impl GenerationRequest {
    pub fn has_reference(&self) -> bool {
        self.reference_image_url.is_some()
    }
}
