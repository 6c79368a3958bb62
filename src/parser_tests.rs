//! Unit tests for the import parser.

use super::*;

fn only(text: &str) -> Candidate {
    let mut all: Vec<Candidate> = parse(text).collect();
    assert_eq!(all.len(), 1, "expected one candidate from {text:?}, got {all:?}");
    all.remove(0)
}

mod scenario_tests {
    use super::*;

    #[test]
    fn numbered_quoted_line() {
        let c = only(r#"1. "Project Hail Mary" by Andy Weir (2021) ⭐ 5/5"#);
        assert_eq!(c.title, "Project Hail Mary");
        assert_eq!(c.author, "Andy Weir");
        assert_eq!(c.year, Some(2021));
        assert_eq!(c.rating, Some(5));
        assert_eq!(c.category, Category::Completed);
        assert!(c.is_book);
        assert!(c.confidence >= 0.8);
    }

    #[test]
    fn dash_line_reads_as_movie() {
        let c = only("Oppenheimer - Christopher Nolan (2023)");
        assert_eq!(c.title, "Oppenheimer");
        assert_eq!(c.author, "Christopher Nolan");
        assert_eq!(c.year, Some(2023));
        assert!(!c.is_book);
    }

    #[test]
    fn bare_line_is_low_confidence() {
        let c = only("Some Untitled Thing");
        assert_eq!(c.title, "Some Untitled Thing");
        assert_eq!(c.author, UNKNOWN_AUTHOR);
        assert_eq!(c.confidence, 0.5);
    }

    #[test]
    fn single_character_titles_are_dropped() {
        assert_eq!(parse("X\n\n   \n").count(), 0);
    }
}

mod header_tests {
    use super::*;

    #[test]
    fn first_matching_rule_wins() {
        assert_eq!(match_header("✅ COMPLETED BOOKS (3)").map(|r| r.name), Some("completed-books"));
        assert_eq!(match_header("Movies I watched").map(|r| r.name), Some("completed-movies"));
        assert_eq!(match_header("📖 CURRENTLY READING (2)").map(|r| r.name), Some("in-progress"));
        assert_eq!(match_header("Want to watch").map(|r| r.name), Some("planned"));
        assert_eq!(match_header("❌ DID NOT FINISH").map(|r| r.name), Some("fails"));
        assert_eq!(match_header("🏆 ALL-TIME FAVORITES (1)").map(|r| r.name), Some("all-time"));
        assert_eq!(match_header("📚 BOOKS").map(|r| r.name), Some("books-section"));
        assert_eq!(match_header("🎬 MOVIES").map(|r| r.name), Some("movies-section"));
    }

    #[test]
    fn item_lines_are_never_headers() {
        assert!(match_header(r#"1. "Dune" by Frank Herbert 🏆 ALL-TIME FAVORITE"#).is_none());
        assert!(match_header("Reading Lolita in Tehran - Azar Nafisi").is_none());
        assert!(match_header("Ready Player One").is_none());
    }

    #[test]
    fn category_header_may_carry_a_year() {
        assert_eq!(match_header("Finished books (2023)").map(|r| r.name), Some("completed-books"));
        assert!(match_header("The Movies (2005)").is_none());
        let c = only("Finished books (2023)\nDune - Frank Herbert");
        assert_eq!(c.category, Category::Completed);
        assert!(c.is_book);
    }

    #[test]
    fn stray_notes_line_does_not_switch_type() {
        assert_eq!(
            classify("Notes: finished it, loved the reading"),
            LineKind::Notes("finished it, loved the reading".to_string())
        );
        let c = only("🎬 MOVIES\nNotes: finished it, loved the reading\nHeat - Michael Mann");
        assert!(!c.is_book);
        assert_eq!(c.notes, None);
    }

    #[test]
    fn header_sets_category_and_type() {
        let text = "Currently watching\nSeverance - Ben Stiller\n\
                    Books I want to read\nThe Hobbit by J.R.R. Tolkien\n";
        let all: Vec<Candidate> = parse(text).collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].category, Category::InProgress);
        assert!(!all[0].is_book);
        assert_eq!(all[1].category, Category::Planned);
        assert!(all[1].is_book);
    }

    #[test]
    fn all_time_section_flags_candidates() {
        let c = only("🏆 ALL-TIME FAVORITES\nDune by Frank Herbert");
        assert_eq!(c.category, Category::AllTime);
        assert!(c.is_all_time);
        assert!(c.into_draft().is_all_time);
    }

    #[test]
    fn type_header_wins_over_keywords() {
        let c = only("🎬 MOVIES\nThe Book Thief by Brian Percival");
        assert!(!c.is_book);
    }
}

mod extraction_tests {
    use super::*;

    #[test]
    fn quoted_by_pattern() {
        let got = ExtractionPattern::QuotedBy.apply(r#""The Road" by Cormac McCarthy (2006)"#);
        assert_eq!(got, Some(("The Road".to_string(), "Cormac McCarthy".to_string())));
    }

    #[test]
    fn dash_pattern() {
        let got = ExtractionPattern::Dash.apply("Spider-Man - Sam Raimi [DVD]");
        assert_eq!(got, Some(("Spider-Man".to_string(), "Sam Raimi".to_string())));
    }

    #[test]
    fn comma_pattern() {
        let got = ExtractionPattern::Comma.apply("Beloved, Toni Morrison, 1987");
        assert_eq!(got, Some(("Beloved".to_string(), "Toni Morrison".to_string())));
    }

    #[test]
    fn bare_by_pattern() {
        let got = ExtractionPattern::BareBy.apply("Middlemarch BY George Eliot ★★★★");
        assert_eq!(got, Some(("Middlemarch".to_string(), "George Eliot".to_string())));
    }

    #[test]
    fn quoted_pattern_takes_priority_over_dash() {
        let (title, author, pattern) =
            extract_title_author(r#""Dune" by Frank Herbert - Completed: 2024-05-01"#);
        assert_eq!(title, "Dune");
        assert_eq!(author, "Frank Herbert");
        assert_eq!(pattern, Some(ExtractionPattern::QuotedBy));
    }

    #[test]
    fn unquoted_export_line_keeps_trailing_fields_out() {
        let c = only("Dune by Frank Herbert (1965) - Completed: 2024-05-01");
        assert_eq!(c.title, "Dune");
        assert_eq!(c.author, "Frank Herbert");
        assert_eq!(c.year, Some(1965));
        assert_eq!(c.completed_date.as_deref(), Some("2024-05-01"));
        assert!(c.is_book);
    }

    #[test]
    fn year_before_dash_is_not_part_of_title() {
        let c = only("Oppenheimer (2023) - Christopher Nolan");
        assert_eq!(c.title, "Oppenheimer");
        assert_eq!(c.author, "Christopher Nolan");
        assert_eq!(c.year, Some(2023));
        assert!(!c.is_book);
    }

    #[test]
    fn comma_title_skips_bracketed_format() {
        let got = ExtractionPattern::Comma.apply("Beloved [ebook], Toni Morrison");
        assert_eq!(got, Some(("Beloved".to_string(), "Toni Morrison".to_string())));
    }

    #[test]
    fn fallback_stops_at_parenthesis() {
        let (title, author, pattern) = extract_title_author("Arrival (2016) [Streaming]");
        assert_eq!(title, "Arrival");
        assert_eq!(author, UNKNOWN_AUTHOR);
        assert_eq!(pattern, None);
    }

    #[test]
    fn ratings() {
        assert_eq!(extract_rating("great 4/5"), Some(4));
        assert_eq!(extract_rating("⭐ 3"), Some(3));
        assert_eq!(extract_rating("★★"), Some(2));
        assert_eq!(extract_rating("⭐⭐⭐⭐"), Some(4));
        assert_eq!(extract_rating("no rating here"), None);
        assert_eq!(extract_rating("9/5"), None);
    }

    #[test]
    fn years_need_parentheses() {
        assert_eq!(extract_year("Dune (1965)"), Some(1965));
        assert_eq!(extract_year("Dune 1965"), None);
    }

    #[test]
    fn notes_quoted_and_plain() {
        assert_eq!(extract_notes(r#"x notes: "loved it" - y"#), Some("loved it".to_string()));
        assert_eq!(extract_notes("x Notes: slow start - y"), Some("slow start".to_string()));
        assert_eq!(extract_notes("no notes here"), None);
    }

    #[test]
    fn formats_in_brackets() {
        assert_eq!(extract_format("[audio]"), Some(Format::Audio));
        assert_eq!(extract_format("[Blu-ray]"), Some(Format::BluRay));
        assert_eq!(extract_format("[HARDCOPY]"), Some(Format::Text));
        assert_eq!(extract_format("[signed] [DVD]"), Some(Format::Dvd));
        assert_eq!(extract_format("[vinyl]"), None);
    }

    #[test]
    fn confidence_is_capped() {
        assert_eq!(confidence(UNKNOWN_AUTHOR, false, false, false), 0.5);
        assert!((confidence("A", true, false, false) - 0.9).abs() < 1e-6);
        assert_eq!(confidence("A", true, true, true), 1.0);
    }
}

mod type_resolution_tests {
    use super::*;

    #[test]
    fn keywords_outweigh_layout() {
        assert!(resolve_is_book("Dune - Frank Herbert novel audiobook", Some(ExtractionPattern::Dash)));
        assert!(!resolve_is_book("Heat by Michael Mann film, watched twice", Some(ExtractionPattern::BareBy)));
    }

    #[test]
    fn ties_fall_back_to_director_or_film() {
        assert!(resolve_is_book("Something", None));
        assert!(!resolve_is_book("Directorial debut", None));
    }
}

mod boilerplate_tests {
    use super::*;

    #[test]
    fn export_scaffolding_is_skipped() {
        assert!(is_boilerplate("═══════════════"));
        assert!(is_boilerplate("Generated: Friday, May 3, 2024 at 09:15"));
        assert!(is_boilerplate("End of Export - Generated by FiftyList App"));
        assert!(is_boilerplate("2024: 12 total (8 books, 4 movies)"));
        assert!(is_boilerplate("-----"));
        assert!(!is_boilerplate("Dune by Frank Herbert"));
    }

    #[test]
    fn classify_orders_rules() {
        assert_eq!(classify("✅ COMPLETED BOOKS (1)"), LineKind::Header("completed-books"));
        assert_eq!(classify(r#"Notes: "reread""#), LineKind::Notes("reread".to_string()));
        assert_eq!(classify("──────"), LineKind::Boilerplate);
        assert_eq!(classify("Dune by Frank Herbert"), LineKind::Item);
    }
}

mod sequence_tests {
    use super::*;

    #[test]
    fn notes_continuation_attaches_to_previous_item() {
        let text = "1. \"Dune\" by Frank Herbert (1965)\n   Notes: \"spice\"\n2. \"Emma\" by Jane Austen";
        let all: Vec<Candidate> = parse(text).collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].notes.as_deref(), Some("spice"));
        assert_eq!(all[1].notes, None);
        assert_eq!(all[1].line, 3);
    }

    #[test]
    fn parsing_is_restartable() {
        let text = "📋 WANT TO READ\nEmma by Jane Austen\nDune by Frank Herbert";
        let mut first = parse(text);
        assert_eq!(first.next().map(|c| c.title), Some("Emma".to_string()));
        assert_eq!(first.state().category, Category::Planned);
        let again: Vec<Candidate> = parse(text).collect();
        assert_eq!(again.len(), 2);
        assert_eq!(again[0].category, Category::Planned);
    }

    #[test]
    fn export_line_fields_are_recovered() {
        let line = "1. \"Dune\" by Frank Herbert (1965) [Hardcopy] ⭐ 5/5 stars (100% complete) \
                    - Completed: 2024-05-01 - Source: Library 🏆 ALL-TIME FAVORITE";
        let c = only(line);
        assert_eq!(c.format, Some(Format::Text));
        assert_eq!(c.completed_date.as_deref(), Some("2024-05-01"));
        assert_eq!(c.source.as_deref(), Some("Library"));
        assert!(c.is_all_time);
        assert_eq!(c.percentage, None);
    }

    #[test]
    fn added_date_survives_reimport() {
        let c = only("📋 WANT TO READ\n1. \"Emma\" by Jane Austen - Added: 2023-01-02");
        assert_eq!(c.category, Category::Planned);
        assert_eq!(c.date_added.as_deref(), Some("2023-01-02"));
        assert_eq!(c.into_draft().date_added.as_deref(), Some("2023-01-02"));
    }

    #[test]
    fn progress_is_kept_outside_completed() {
        let c = only("📖 CURRENTLY READING\n1. \"Emma\" by Jane Austen (1815) (40% complete)");
        assert_eq!(c.category, Category::InProgress);
        assert_eq!(c.percentage, Some(40));
    }

    #[test]
    fn confidence_filter() {
        let text = "Some Untitled Thing\n\"Dune\" by Frank Herbert (1965)";
        let kept = parse_confident(text, 0.8);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Dune");
    }
}
