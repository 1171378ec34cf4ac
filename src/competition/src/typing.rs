//! Applicant typing by keyword match against predefined class lists
//! (spec §4.7). First matching class wins.

/// Class name, then its keyword list, checked case-insensitively. Order
/// matters: earlier classes take priority over later ones ("first-match
/// wins").
const TYPE_RULES: &[(&str, &[&str])] = &[
    ("university", &["大学", "学院", "university", "college", "institute of technology"]),
    (
        "research_institute",
        &["研究院", "研究所", "科学院", "实验室", "institute", "laboratory", "research"],
    ),
    ("conglomerate", &["集团", "控股", "group", "holdings", "corporation", "corp", "inc"]),
    (
        "tech_company",
        &["科技", "技术", "软件", "信息", "technology", "tech", "software", "information"],
    ),
    ("manufacturer", &["制造", "工业", "机械", "manufacturing", "industrial", "machinery"]),
    ("foreign_entity", &["ltd", "llc", "gmbh", "co.", "company", "limited"]),
];

/// Classifies a normalized applicant name into one of spec §4.7's
/// predefined types, or `"other"` if nothing matches.
pub fn classify(applicant: &str) -> &'static str {
    let lower = applicant.to_lowercase();
    for (type_name, keywords) in TYPE_RULES {
        if keywords.iter().any(|k| lower.contains(&k.to_lowercase())) {
            return type_name;
        }
    }
    "other"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_university() {
        assert_eq!(classify("Stanford University"), "university");
    }

    #[test]
    fn classifies_tech_company() {
        assert_eq!(classify("华为技术"), "tech_company");
    }

    #[test]
    fn falls_back_to_other() {
        assert_eq!(classify("Jane Doe"), "other");
    }

    #[test]
    fn first_match_wins_over_later_classes() {
        // contains both "research" (research_institute) and "tech" (tech_company);
        // research_institute is listed first.
        assert_eq!(classify("Advanced Research Technologies"), "research_institute");
    }
}
