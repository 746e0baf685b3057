//! Every book's chapter and verse boundaries parse from its abbreviation
//! and format back to the same place

use lectio_core::{Canon, ChapterRef, Location, ParseError, ReferenceParser};

#[test]
fn test_boundaries_of_every_book_round_trip() {
    let canon = Canon::standard();
    let parser = ReferenceParser::new(&canon);

    for book in canon.books() {
        for chapter in [1, book.chapter_count] {
            let last_verse = book.verse_count(chapter).unwrap();
            for verse in [1, last_verse] {
                let text = format!("{} {}:{}", book.abbreviation, chapter, verse);
                let parsed = parser
                    .parse(&text)
                    .unwrap_or_else(|e| panic!("{} failed: {}", text, e));
                assert_eq!(parsed.book_id(), book.id, "{}", text);
                assert_eq!(parsed.chapter, chapter, "{}", text);
                assert_eq!(parsed.verse_start, Some(verse), "{}", text);

                let formatted = parsed.to_string();
                assert_eq!(parser.parse(&formatted).unwrap(), parsed, "{}", formatted);
            }

            let past_end = format!("{} {}:{}", book.abbreviation, chapter, last_verse + 1);
            assert!(
                matches!(parser.parse(&past_end), Err(ParseError::VerseOutOfRange { .. })),
                "{}",
                past_end
            );
        }

        let past_last_chapter = format!("{} {}", book.name, book.chapter_count + 1);
        assert!(
            matches!(
                parser.parse(&past_last_chapter),
                Err(ParseError::ChapterOutOfRange { .. })
            ),
            "{}",
            past_last_chapter
        );
    }
}

#[test]
fn test_walking_the_whole_canon_visits_every_verse() {
    let canon = Canon::standard();
    let mut location = Location::new(&canon, 1, 1, 1).unwrap();
    let mut visited = 1u32;
    while let Some(next) = location.next(&canon) {
        assert!(next > location);
        location = next;
        visited += 1;
    }
    assert_eq!(Some(visited), canon.total_verses());
    assert_eq!(location.display(&canon), "Revelation 22:21");

    let mut chapters = 1u32;
    let mut chapter = ChapterRef::new(&canon, 1, 1).unwrap();
    while let Some(next) = chapter.next(&canon) {
        chapter = next;
        chapters += 1;
    }
    assert_eq!(chapters, canon.total_chapters());
}
