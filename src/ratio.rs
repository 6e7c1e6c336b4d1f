/// Instagram aspect-ratio presets offered by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Square,
    Portrait,
    Landscape,
}

impl AspectRatio {
    /// Every preset, in the order the radio group shows them.
    pub const ALL: [AspectRatio; 3] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1 (Square)",
            AspectRatio::Portrait => "4:5 (Portrait)",
            AspectRatio::Landscape => "16:9 (Landscape)",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ratio| ratio.label() == label)
    }

    /// (width units, height units)
    pub fn units(self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1, 1),
            AspectRatio::Portrait => (4, 5),
            AspectRatio::Landscape => (16, 9),
        }
    }

    /// Target width/height ratio as a float.
    pub fn value(self) -> f64 {
        let (w, h) = self.units();
        w as f64 / h as f64
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Square
    }
}
