pub const PURPLE: &str = "#a855f7";
pub const VIOLET: &str = "#8b5cf6";
pub const LAVENDER: &str = "#c084fc";
pub const PINK: &str = "#ec4899";
pub const HOT_PINK: &str = "#f472b6";
pub const ROSE: &str = "#fb7185";
pub const CYAN: &str = "#06b6d4";
pub const BRIGHT_CYAN: &str = "#22d3ee";
pub const LIGHT_CYAN: &str = "#2dd4bf";
pub const BLUE: &str = "#3b82f6";
pub const MAGENTA: &str = "#c026d3";
pub const INDIGO: &str = "#6366f1";
pub const PERIWINKLE: &str = "#818cf8";
pub const TEAL: &str = "#14b8a6";
pub const EMERALD: &str = "#34d399";
pub const AMBER: &str = "#fbbf24";
pub const DEFAULT: &str = "#e879f9";

/// Accent used for every tag node, independent of classification.
pub const TAG_ACCENT: &str = "#00D9FF";

const DOMAIN_COLORS: &[(&str, &str)] = &[
    ("Languages", "#FF6B6B"),
    ("Algorithms", "#4ECDC4"),
    ("OperatingSystems", "#45B7D1"),
    ("Standards", "#96CEB4"),
    ("Tools", "#FFEAA7"),
    ("SystemDesign", "#DDA15E"),
    ("Databases", "#BC6C25"),
    ("DevOps", "#606C38"),
    ("Security", "#E63946"),
    ("AIML", "#A8DADC"),
    ("Desktop", "#457B9D"),
    ("Networking", "#1D3557"),
    ("Cloud", "#F1FAEE"),
    ("Mobile", "#E76F51"),
    ("Web", "#2A9D8F"),
    ("Testing", "#E9C46A"),
    ("Performance", "#F4A261"),
    ("Graphics", "#264653"),
    ("Data", "#7209B7"),
    ("DistributedSystems", "#560BAD"),
    ("ProjectTemplates", "#B5179E"),
    ("SoftwareEngineering", "#F72585"),
    ("Mathematics", "#4CC9F0"),
    ("Environment", "#4895EF"),
];

/// Strips a leading `NN_` ordering prefix and any hyphens, so `"07_AI-ML"` becomes `"AIML"`.
pub fn normalize_domain(domain: &str) -> String {
    let without_prefix = match domain.split_once('_') {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) => {
            rest
        }
        _ => domain,
    };
    without_prefix.replace('-', "")
}

pub fn domain_color(domain: &str) -> Option<&'static str> {
    let normalized = normalize_domain(domain);
    DOMAIN_COLORS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, color)| *color)
}

pub fn is_hex_color(value: &str) -> bool {
    value.starts_with('#')
}
