//! Heuristic score adjustments.
//!
//! Two additive passes run after the base scorer: path/extension/recency
//! boosts driven by the raw query, then a keyword pass over path and
//! content. Every contribution is independent and commutative, so the final
//! score does not depend on evaluation order, and each firing rule appends
//! one reason string.

use crate::types::FileCandidate;

// Tuned boost constants. These came out of manual tuning against real
// workspaces; change them together with the selection threshold.
const BASENAME_MATCH_BOOST: f64 = 0.8;
const PARENT_MATCH_BOOST: f64 = 0.4;
const COMPONENT_EXT_BOOST: f64 = 0.6;
const SCRIPT_EXT_BOOST: f64 = 0.4;
const STYLE_EXT_BOOST: f64 = 0.6;
const CONFIG_FILE_BOOST: f64 = 0.7;
const TEST_FILE_BOOST: f64 = 0.5;
const TEST_FILE_PENALTY: f64 = -0.3;
const RECENCY_DAY_BOOST: f64 = 0.5;
const RECENCY_WEEK_BOOST: f64 = 0.3;
const RECENCY_MONTH_BOOST: f64 = 0.1;
const AUTO_INCLUDE_BOOST: f64 = 10.0;

const WATERMARK_TOPIC_BOOST: f64 = 2.0;
const THEME_TOPIC_BOOST: f64 = 1.5;
const UNRELATED_CATEGORY_PENALTY: f64 = -5.0;
const KEYWORD_HINT_BOOST: f64 = 0.5;
const KEYWORD_HINT_PENALTY: f64 = -0.5;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Config file basenames boosted for configuration queries.
const CONFIG_BASENAMES: &[&str] = &["package.json", "tsconfig.json", ".env"];

/// Keywords that signal a watermark/branding question.
const WATERMARK_KEYWORDS: &[&str] = &["watermark", "ternary", "made"];

/// Keywords that signal a theming question.
const THEME_KEYWORDS: &[&str] = &["theme", "toggle", "dark", "light"];

/// Path fragments where theming usually lives.
const THEME_PATHS: &[&str] = &[
    "theme",
    "toggle",
    "globals.css",
    "tailwind.config",
    "index.html",
    "app.css",
    "layout",
    "themetoggle",
    "toggle-group",
];

/// Path tokens penalized when the query shows no interest in them.
const NEGATIVE_CATEGORIES: &[&str] = &[
    "chart",
    "charts",
    "graph",
    "analytics",
    "test",
    "stories",
    "storybook",
];

// ---------------------------------------------------------------------------
// Heuristic pass
// ---------------------------------------------------------------------------

/// Apply path, extension, recency, and auto-include boosts.
///
/// `now_ms` is passed in (rather than read from the clock) so scoring is a
/// pure function of its inputs.
pub fn apply_heuristics(
    candidates: &mut [FileCandidate],
    keywords: &[String],
    query: &str,
    now_ms: u64,
) {
    let query_lower = query.to_lowercase();

    for candidate in candidates.iter_mut() {
        let basename = candidate.basename();
        let parent = candidate.parent_path();
        let extension = candidate.extension();

        for keyword in keywords {
            if basename.contains(keyword.as_str()) {
                candidate.score += BASENAME_MATCH_BOOST;
                candidate
                    .reasons
                    .push(format!("filename match '{keyword}' (+{BASENAME_MATCH_BOOST})"));
            }
            if parent.contains(keyword.as_str()) {
                candidate.score += PARENT_MATCH_BOOST;
                candidate
                    .reasons
                    .push(format!("path match '{keyword}' (+{PARENT_MATCH_BOOST})"));
            }
        }

        if matches!(extension.as_str(), ".tsx" | ".jsx") && query_lower.contains("component") {
            candidate.score += COMPONENT_EXT_BOOST;
            candidate
                .reasons
                .push(format!("component file for component query (+{COMPONENT_EXT_BOOST})"));
        }
        if matches!(extension.as_str(), ".ts" | ".js") && query_lower.contains("function") {
            candidate.score += SCRIPT_EXT_BOOST;
            candidate
                .reasons
                .push(format!("script file for function query (+{SCRIPT_EXT_BOOST})"));
        }
        if extension == ".css" && query_lower.contains("style") {
            candidate.score += STYLE_EXT_BOOST;
            candidate
                .reasons
                .push(format!("stylesheet for style query (+{STYLE_EXT_BOOST})"));
        }

        if CONFIG_BASENAMES.contains(&basename.as_str())
            && (query_lower.contains("config") || query_lower.contains("setup"))
        {
            candidate.score += CONFIG_FILE_BOOST;
            candidate
                .reasons
                .push(format!("config file for config query (+{CONFIG_FILE_BOOST})"));
        }

        if basename.contains("test") || basename.contains("spec") {
            if query_lower.contains("test") {
                candidate.score += TEST_FILE_BOOST;
                candidate
                    .reasons
                    .push(format!("test file for test query (+{TEST_FILE_BOOST})"));
            } else {
                candidate.score += TEST_FILE_PENALTY;
                candidate
                    .reasons
                    .push(format!("test file ({TEST_FILE_PENALTY})"));
            }
        }

        if let Some(mtime_ms) = candidate.mtime_ms {
            let age_ms = now_ms.saturating_sub(mtime_ms);
            if age_ms < DAY_MS {
                candidate.score += RECENCY_DAY_BOOST;
                candidate
                    .reasons
                    .push(format!("modified today (+{RECENCY_DAY_BOOST})"));
            } else if age_ms < 7 * DAY_MS {
                candidate.score += RECENCY_WEEK_BOOST;
                candidate
                    .reasons
                    .push(format!("modified this week (+{RECENCY_WEEK_BOOST})"));
            } else if age_ms < 30 * DAY_MS {
                candidate.score += RECENCY_MONTH_BOOST;
                candidate
                    .reasons
                    .push(format!("modified this month (+{RECENCY_MONTH_BOOST})"));
            }
        }

        if candidate.is_auto_include {
            candidate.score += AUTO_INCLUDE_BOOST;
            candidate
                .reasons
                .push(format!("auto-include (+{AUTO_INCLUDE_BOOST})"));
        }
    }
}

// ---------------------------------------------------------------------------
// Keyword post-adjustment
// ---------------------------------------------------------------------------

/// Apply the keyword pass over path and content: topic boosts, the
/// unrelated-category penalty, and the keyword hint.
pub fn apply_keyword_adjustments(candidates: &mut [FileCandidate], keywords: &[String]) {
    for candidate in candidates.iter_mut() {
        let path_lower = candidate.file.path.to_lowercase();
        let basename = candidate.basename();
        let parent = candidate.parent_path();
        let content_lower = candidate.file.content.to_lowercase();

        let wants_watermark = keywords
            .iter()
            .any(|k| WATERMARK_KEYWORDS.contains(&k.as_str()));
        if wants_watermark
            && (basename.contains("made-with-ternary")
                || basename.contains("watermark")
                || content_lower.contains("made with ternary"))
        {
            candidate.score += WATERMARK_TOPIC_BOOST;
            candidate
                .reasons
                .push(format!("watermark topic (+{WATERMARK_TOPIC_BOOST})"));
        }

        let wants_theme = keywords.iter().any(|k| THEME_KEYWORDS.contains(&k.as_str()));
        if wants_theme
            && THEME_PATHS
                .iter()
                .any(|p| path_lower.contains(p) || basename.contains(p))
        {
            candidate.score += THEME_TOPIC_BOOST;
            candidate
                .reasons
                .push(format!("theme topic (+{THEME_TOPIC_BOOST})"));
        }

        let keyword_in_path_or_content = keywords
            .iter()
            .any(|k| path_lower.contains(k.as_str()) || content_lower.contains(k.as_str()));

        let unmentioned_category = NEGATIVE_CATEGORIES.iter().find(|&&category| {
            (path_lower.contains(category) || basename.contains(category))
                && !keywords.iter().any(|k| k.contains(category))
        });
        if let Some(category) = unmentioned_category {
            if !keyword_in_path_or_content {
                candidate.score += UNRELATED_CATEGORY_PENALTY;
                candidate.reasons.push(format!(
                    "unrelated category '{category}' ({UNRELATED_CATEGORY_PENALTY})"
                ));
            }
        }

        let keyword_hint = keywords.iter().any(|k| {
            basename.contains(k.as_str())
                || parent.contains(k.as_str())
                || content_lower.contains(k.as_str())
        });
        if keyword_hint {
            candidate.score += KEYWORD_HINT_BOOST;
            candidate
                .reasons
                .push(format!("keyword match (+{KEYWORD_HINT_BOOST})"));
        } else {
            candidate.score += KEYWORD_HINT_PENALTY;
            candidate
                .reasons
                .push(format!("no keyword match ({KEYWORD_HINT_PENALTY})"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::extract_keywords;
    use ternary_fs::CodebaseFile;

    fn candidate(path: &str, content: &str) -> FileCandidate {
        FileCandidate {
            file: CodebaseFile {
                path: path.into(),
                content: content.into(),
                force: false,
            },
            score: 0.0,
            reasons: Vec::new(),
            is_auto_include: false,
            tokens: 1,
            mtime_ms: None,
        }
    }

    fn run_heuristics(c: &mut FileCandidate, query: &str, now_ms: u64) {
        let keywords = extract_keywords(query);
        apply_heuristics(std::slice::from_mut(c), &keywords, query, now_ms);
    }

    fn run_keywords(c: &mut FileCandidate, query: &str) {
        let keywords = extract_keywords(query);
        apply_keyword_adjustments(std::slice::from_mut(c), &keywords);
    }

    // -- Heuristic pass ------------------------------------------------------

    #[test]
    fn basename_match_beats_parent_match() {
        let mut in_name = candidate("src/auth/login.ts", "");
        let mut in_dir = candidate("src/login/session.ts", "");
        run_heuristics(&mut in_name, "login flow", 0);
        run_heuristics(&mut in_dir, "login flow", 0);

        assert!((in_name.score - 0.8).abs() < 1e-9);
        assert!((in_dir.score - 0.4).abs() < 1e-9);
        assert!(in_name.reasons.iter().any(|r| r.contains("filename match")));
        assert!(in_dir.reasons.iter().any(|r| r.contains("path match")));
    }

    #[test]
    fn component_extension_boost_requires_component_query() {
        let mut c = candidate("src/Button.tsx", "");
        run_heuristics(&mut c, "make a new component", 0);
        assert!((c.score - 0.6).abs() < 1e-9);

        let mut without = candidate("src/Button.tsx", "");
        run_heuristics(&mut without, "fix the parser", 0);
        assert_eq!(without.score, 0.0);
    }

    #[test]
    fn style_and_script_extension_boosts() {
        let mut css = candidate("src/app.css", "");
        run_heuristics(&mut css, "change the style", 0);
        assert!((css.score - 0.6).abs() < 1e-9);

        let mut ts = candidate("src/util.ts", "");
        run_heuristics(&mut ts, "add a helper function", 0);
        assert!((ts.score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn config_files_boosted_for_setup_queries() {
        let mut c = candidate("tsconfig.json", "{}");
        run_heuristics(&mut c, "project setup", 0);
        assert!((c.score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_files_swing_on_query_intent() {
        let mut wanted = candidate("src/auth.test.ts", "");
        run_heuristics(&mut wanted, "fix the failing test", 0);
        assert!(wanted.score > 0.0);
        assert!(wanted.reasons.iter().any(|r| r.contains("+0.5")));

        let mut unwanted = candidate("src/auth.test.ts", "");
        run_heuristics(&mut unwanted, "refactor auth", 0);
        // -0.3 test penalty + 0.8 filename match for "auth".
        assert!((unwanted.score - 0.5).abs() < 1e-9);
        assert!(unwanted.reasons.iter().any(|r| r.contains("-0.3")));
    }

    #[test]
    fn recency_tiers() {
        let now = 100 * DAY_MS;
        let cases = [
            (now - DAY_MS / 2, 0.5),
            (now - 3 * DAY_MS, 0.3),
            (now - 20 * DAY_MS, 0.1),
            (now - 40 * DAY_MS, 0.0),
        ];
        for (mtime, expected) in cases {
            let mut c = candidate("src/plain.xyz", "");
            c.mtime_ms = Some(mtime);
            run_heuristics(&mut c, "unrelated query words", now);
            assert!(
                (c.score - expected).abs() < 1e-9,
                "mtime={mtime} expected={expected} got={}",
                c.score
            );
        }
    }

    #[test]
    fn missing_mtime_skips_recency() {
        let mut c = candidate("src/plain.xyz", "");
        run_heuristics(&mut c, "unrelated query words", 100 * DAY_MS);
        assert_eq!(c.score, 0.0);
    }

    #[test]
    fn auto_include_gets_large_boost() {
        let mut c = candidate("config/secrets.env", "");
        c.is_auto_include = true;
        run_heuristics(&mut c, "fix login bug", 0);
        assert!(c.score >= 10.0);
        assert!(c.reasons.iter().any(|r| r.contains("auto-include")));
    }

    // -- Keyword pass --------------------------------------------------------

    #[test]
    fn watermark_topic_boost() {
        let mut by_name = candidate("src/components/made-with-ternary.tsx", "");
        run_keywords(&mut by_name, "remove the watermark");
        assert!(by_name.reasons.iter().any(|r| r.contains("watermark topic")));

        let mut by_content = candidate("src/footer.tsx", "<span>made with ternary</span>");
        run_keywords(&mut by_content, "remove the watermark");
        assert!(by_content.reasons.iter().any(|r| r.contains("watermark topic")));
    }

    #[test]
    fn theme_topic_boost() {
        let mut c = candidate("src/app/globals.css", ":root { }");
        run_keywords(&mut c, "add a dark mode toggle");
        assert!(c.reasons.iter().any(|r| r.contains("theme topic")));
    }

    #[test]
    fn unrelated_chart_file_penalized() {
        let mut c = candidate(
            "src/components/chart/BarChart.tsx",
            "export const BarChart = () => null;",
        );
        run_keywords(&mut c, "improve login validation");
        assert!(c.score < -4.0);
        assert!(c.reasons.iter().any(|r| r.contains("unrelated category")));
    }

    #[test]
    fn chart_file_not_penalized_when_query_mentions_charts() {
        let mut c = candidate(
            "src/components/chart/BarChart.tsx",
            "export const BarChart = () => null;",
        );
        run_keywords(&mut c, "fix the chart axis labels");
        assert!(!c.reasons.iter().any(|r| r.contains("unrelated category")));
        // "chart" matches the path, so the hint boost fires instead.
        assert!(c.score > 0.0);
    }

    #[test]
    fn chart_file_not_penalized_when_keyword_matches_content() {
        let mut c = candidate(
            "src/components/chart/Revenue.tsx",
            "// renders the revenue breakdown",
        );
        run_keywords(&mut c, "show revenue numbers");
        assert!(!c.reasons.iter().any(|r| r.contains("unrelated category")));
    }

    #[test]
    fn keyword_hint_swings_both_ways() {
        let mut hit = candidate("src/login.ts", "function login() {}");
        run_keywords(&mut hit, "fix login");
        assert!(hit.score > 0.0);
        assert!(hit.reasons.iter().any(|r| r.contains("keyword match")));

        let mut miss = candidate("src/other.xyz", "nothing relevant here");
        run_keywords(&mut miss, "fix login");
        assert!((miss.score + 0.5).abs() < 1e-9);
        assert!(miss.reasons.iter().any(|r| r.contains("no keyword match")));
    }

    #[test]
    fn adjustments_are_order_independent() {
        let query = "add a dark mode toggle to the chart";
        let keywords = extract_keywords(query);

        let mut a = candidate("src/components/ThemeToggle.tsx", "const dark = true;");
        let mut b = a.clone();

        apply_heuristics(std::slice::from_mut(&mut a), &keywords, query, 0);
        apply_keyword_adjustments(std::slice::from_mut(&mut a), &keywords);

        apply_keyword_adjustments(std::slice::from_mut(&mut b), &keywords);
        apply_heuristics(std::slice::from_mut(&mut b), &keywords, query, 0);

        assert!((a.score - b.score).abs() < 1e-9);
    }
}
