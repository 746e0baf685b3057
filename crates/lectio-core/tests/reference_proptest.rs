//! Property-based tests for reference parsing and lens partitioning

use proptest::prelude::*;

use lectio_core::{Canon, Insight, Lens, LensPartition, ReferenceParser};

/// A (book, chapter, verse start, verse end) inside the standard canon
fn reference_strategy() -> impl Strategy<Value = (usize, u16, u16, u16)> {
    let canon = Canon::standard();
    let shapes: Vec<(u16, Vec<u16>)> = canon
        .books()
        .iter()
        .map(|b| (b.chapter_count, b.verse_counts.clone().unwrap_or_default()))
        .collect();

    (0..shapes.len())
        .prop_flat_map(move |book| {
            let (chapters, counts) = shapes[book].clone();
            (Just(book), 1..=chapters).prop_flat_map(move |(book, chapter)| {
                let max = counts[usize::from(chapter) - 1];
                (Just(book), Just(chapter), 1..=max, 1..=max)
            })
        })
        .prop_map(|(book, chapter, a, b)| (book, chapter, a.min(b), a.max(b)))
}

fn separator_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(":"), Just("."), Just(" "), Just(" : ")]
}

fn dash_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("-"), Just("–"), Just(" - "), Just("—")]
}

fn lens_strategy() -> impl Strategy<Value = Lens> {
    prop_oneof![
        Just(Lens::Theology),
        Just(Lens::Question),
        Just(Lens::Connection),
        Just(Lens::Lexical),
    ]
}

fn insight(id: usize, lens: Lens) -> Insight {
    Insight {
        id: format!("insight-{}", id),
        book_id: 1,
        chapter: 1,
        verse_start: 1,
        verse_end: 1,
        lens,
        title: String::new(),
        content: String::new(),
        sources: Vec::new(),
        is_interpretive: false,
        content_version: 1,
        prompt_version: String::new(),
        model_version: String::new(),
        created_at: String::new(),
    }
}

proptest! {
    #[test]
    fn parse_then_format_is_idempotent(
        (book, chapter, start, end) in reference_strategy(),
        sep in separator_strategy(),
        dash in dash_strategy(),
        upper in any::<bool>(),
    ) {
        let canon = Canon::standard();
        let parser = ReferenceParser::new(&canon);
        let name = &canon.books()[book].name;
        let name = if upper { name.to_uppercase() } else { name.to_lowercase() };

        let text = if start == end {
            format!("{} {}{}{}", name, chapter, sep, start)
        } else {
            format!("{} {}{}{}{}{}", name, chapter, sep, start, dash, end)
        };

        let parsed = parser.parse(&text).unwrap();
        prop_assert_eq!(parsed.chapter, chapter);
        prop_assert_eq!(parsed.verse_start, Some(start));
        prop_assert_eq!(parsed.verse_end, Some(end));

        let formatted = parsed.to_string();
        let reparsed = parser.parse(&formatted).unwrap();
        prop_assert_eq!(reparsed.to_string(), formatted);
        prop_assert_eq!(reparsed, parsed);
    }

    #[test]
    fn parser_never_panics(text in "\\PC{0,40}") {
        let canon = Canon::standard();
        let parser = ReferenceParser::new(&canon);
        let _ = parser.parse(&text);
        let _ = parser.extract(&text);
    }

    #[test]
    fn partition_is_complete_and_stable(lenses in prop::collection::vec(lens_strategy(), 0..40)) {
        let insights: Vec<Insight> = lenses
            .iter()
            .enumerate()
            .map(|(i, lens)| insight(i, *lens))
            .collect();
        let partition = LensPartition::classify(&insights);

        let total: usize = Lens::all().iter().map(|lens| partition.get(*lens).len()).sum();
        prop_assert_eq!(total, insights.len());
        prop_assert_eq!(partition.len(), insights.len());

        for lens in Lens::all() {
            let expected: Vec<&str> = insights
                .iter()
                .filter(|i| i.lens == lens)
                .map(|i| i.id.as_str())
                .collect();
            let actual: Vec<&str> = partition.get(lens).iter().map(|i| i.id.as_str()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
