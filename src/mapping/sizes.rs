//! Static output-size tables per provider family.
//!
//! Each row is (aspect ratio, resolution tier, provider-native "WxH").
//! Lookups are exact string matches in both directions; a miss is not an
//! error — the provider falls back to its own default output size.

/// Full aspect x tier grid for Gemini 3 Pro.
pub(super) const GEMINI_3_PRO_SIZES: &[(&str, &str, &str)] = &[
    ("1:1", "1K", "1024x1024"),
    ("1:1", "2K", "2048x2048"),
    ("1:1", "4K", "4096x4096"),
    ("2:3", "1K", "848x1264"),
    ("2:3", "2K", "1696x2528"),
    ("2:3", "4K", "3392x5056"),
    ("3:2", "1K", "1264x848"),
    ("3:2", "2K", "2528x1696"),
    ("3:2", "4K", "5056x3392"),
    ("3:4", "1K", "896x1200"),
    ("3:4", "2K", "1792x2400"),
    ("3:4", "4K", "3584x4800"),
    ("4:3", "1K", "1200x896"),
    ("4:3", "2K", "2400x1792"),
    ("4:3", "4K", "4800x3584"),
    ("4:5", "1K", "928x1152"),
    ("4:5", "2K", "1856x2304"),
    ("4:5", "4K", "3712x4608"),
    ("5:4", "1K", "1152x928"),
    ("5:4", "2K", "2304x1856"),
    ("5:4", "4K", "4608x3712"),
    ("9:16", "1K", "768x1376"),
    ("9:16", "2K", "1536x2752"),
    ("9:16", "4K", "3072x5504"),
    ("16:9", "1K", "1376x768"),
    ("16:9", "2K", "2752x1536"),
    ("16:9", "4K", "5504x3072"),
    ("21:9", "1K", "1584x672"),
    ("21:9", "2K", "3168x1344"),
    ("21:9", "4K", "6336x2688"),
];

/// Single-tier grid for GPT Image 1.5, keyed on aspect ratio only.
pub(super) const GPT_IMAGE_SIZES: &[(&str, &str, &str)] = &[
    ("1:1", "", "1024x1024"),
    ("2:3", "", "1024x1536"),
    ("3:2", "", "1536x1024"),
];

/// Exact (aspect, resolution) lookup into a size table.
pub(super) fn lookup(
    table: &'static [(&str, &str, &str)],
    aspect: &str,
    resolution: &str,
) -> Option<&'static str> {
    table
        .iter()
        .find(|(a, r, _)| *a == aspect && *r == resolution)
        .map(|(_, _, size)| *size)
}

/// Exact reverse lookup of a stored "WxH" value. No nearest-match heuristics.
pub(super) fn reverse(
    table: &'static [(&str, &str, &str)],
    size: &str,
) -> Option<(&'static str, &'static str)> {
    table
        .iter()
        .find(|(_, _, s)| *s == size)
        .map(|(a, r, _)| (*a, *r))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_exact() {
        assert_eq!(lookup(GEMINI_3_PRO_SIZES, "16:9", "2K"), Some("2752x1536"));
        assert_eq!(lookup(GEMINI_3_PRO_SIZES, "16:9", "3K"), None);
        assert_eq!(lookup(GEMINI_3_PRO_SIZES, "17:9", "2K"), None);
        assert_eq!(lookup(GPT_IMAGE_SIZES, "1:1", ""), Some("1024x1024"));
        assert_eq!(lookup(GPT_IMAGE_SIZES, "1:1", "2K"), None);
    }

    #[test]
    fn reverse_is_exact() {
        assert_eq!(reverse(GEMINI_3_PRO_SIZES, "2752x1536"), Some(("16:9", "2K")));
        assert_eq!(reverse(GPT_IMAGE_SIZES, "1536x1024"), Some(("3:2", "")));
        assert_eq!(reverse(GEMINI_3_PRO_SIZES, "2752x1537"), None);
    }

    #[test]
    fn gemini_3_pro_grid_is_complete() {
        // Every aspect must carry all three tiers, and sizes must be unique
        // for the reverse lookup to be well-defined.
        let aspects = ["1:1", "2:3", "3:2", "3:4", "4:3", "4:5", "5:4", "9:16", "16:9", "21:9"];
        let tiers = ["1K", "2K", "4K"];
        assert_eq!(GEMINI_3_PRO_SIZES.len(), aspects.len() * tiers.len());
        for aspect in aspects {
            for tier in tiers {
                assert!(lookup(GEMINI_3_PRO_SIZES, aspect, tier).is_some());
            }
        }

        let mut sizes: Vec<&str> = GEMINI_3_PRO_SIZES.iter().map(|(_, _, s)| *s).collect();
        sizes.sort_unstable();
        sizes.dedup();
        assert_eq!(sizes.len(), GEMINI_3_PRO_SIZES.len());
    }
}
