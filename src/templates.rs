//! Sample letters for testing and demonstration.
//!
//! Each sample exercises a different part of the layout engine. They carry an
//! embedded 1×1 PNG as the department signature so they render without any
//! files on disk.

use crate::config::{
    Alignment, ContentBlock, LetterConfig, LetterDefinition, Location, SeparatorBlock, ShowPolicy, TextBlock,
};
use crate::style::{StyleOverrides, TextAlign};
use crate::writer::TableTheme;

/// Names accepted by [`sample`].
pub const SAMPLE_NAMES: [&str; 4] = ["basic", "long", "alignment", "table"];

/// A 1×1 PNG used as the placeholder signature.
pub const PLACEHOLDER_SIGNATURE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Look a sample up by name.
pub fn sample(name: &str) -> Option<LetterDefinition> {
    match name {
        "basic" => Some(basic_letter()),
        "long" => Some(long_letter()),
        "alignment" => Some(alignment_letter()),
        "table" => Some(table_letter()),
        _ => None,
    }
}

fn config(file_name: &str) -> LetterConfig {
    LetterConfig::new(file_name, PLACEHOLDER_SIGNATURE)
}

/// Address block, greeting, a few paragraphs and a signature line.
pub fn basic_letter() -> LetterDefinition {
    LetterDefinition {
        config: config("basic-letter"),
        blocks: vec![
            ContentBlock::text("Dr. Sarah Chen\nDirector, Research Programs\n200 Kent Street\nOttawa ON  K1A 0E6"),
            ContentBlock::text("# Approval of funding request"),
            ContentBlock::text(
                "Dear Dr. Chen,\n\n\
                 I am pleased to confirm that your request for **operating funds** has been \
                 approved for the *2024-2025* fiscal year. The attached schedule sets out the \
                 payment dates and reporting requirements.\n\n\
                 Please review the conditions below:\n\n\
                 - Quarterly progress reports are due 30 days after each quarter.\n\
                 - Unspent funds must be returned by ***March 31***.\n\
                 - Changes to the project scope require written approval.",
            ),
            ContentBlock::separator(),
            ContentBlock::text("Sincerely,\n\n\nJ. Tremblay\nAssistant Deputy Minister"),
        ],
    }
}

/// Enough content for several pages, with page numbers, continuation
/// indicators and a tracking number.
pub fn long_letter() -> LetterDefinition {
    let mut config = config("long-letter");
    config.page_numbers.show = ShowPolicy::SkipFirst;
    config.next_page.show = ShowPolicy::Always;
    config.letter_number.show = true;
    config.letter_number.number = Some("VAC-2024-003".to_string());
    config.letter_version = Some("1.2".to_string());

    let paragraph = "Under the program terms, recipients keep complete records of eligible \
                     expenditures and make them available on request. Records include invoices, \
                     proof of payment and any agreements with third parties, and are kept for \
                     six years after the end of the funding period.";

    let mut blocks = vec![ContentBlock::text("# Program terms and conditions")];
    for section in 1..=12 {
        blocks.push(ContentBlock::text(format!("## Section {section}\n\n{paragraph}")));
        if section % 4 == 0 {
            blocks.push(ContentBlock::separator());
        }
    }
    blocks.push(ContentBlock::text("1. Sign both copies.\n2. Keep one copy.\n3. Return the other copy."));

    LetterDefinition { config, blocks }
}

/// The same paragraph in each alignment, plus a block that refuses to break.
pub fn alignment_letter() -> LetterDefinition {
    let mut config = config("alignment-letter");
    config.page_numbers.show = ShowPolicy::Always;
    config.page_numbers.location = Location::Footer;
    config.page_numbers.alignment = Alignment::Right;
    config.page_numbers.format = "Page #".to_string();

    let text = "The quick brown fox jumps over the lazy dog while the committee reviews the \
                proposal, and the review continues until every member has had a chance to \
                comment on the budget and timeline.";

    let mut blocks = Vec::new();
    for align in [TextAlign::Left, TextAlign::Center, TextAlign::Right, TextAlign::Full] {
        let style = StyleOverrides {
            text_align: Some(align),
            ..StyleOverrides::default()
        };
        blocks.push(ContentBlock::text(format!("### {align:?}")));
        blocks.push(TextBlock::new(text).with_style(style).into());
    }
    blocks.push(
        SeparatorBlock {
            spacing_before: Some("4mm".to_string()),
            spacing_after: Some("6mm".to_string()),
        }
        .into(),
    );
    let serif = StyleOverrides {
        font_face: Some("Times".to_string()),
        text_size_normal: Some("12pt".to_string()),
        ..StyleOverrides::default()
    };
    blocks.push(
        TextBlock::new("This closing note is set in a serif face and kept on one page.")
            .with_style(serif)
            .keep_together()
            .into(),
    );

    LetterDefinition { config, blocks }
}

/// A payment schedule long enough to continue onto a second page.
pub fn table_letter() -> LetterDefinition {
    let mut config = config("table-letter");
    config.table_style.theme = TableTheme::Striped;
    config.next_page.show = ShowPolicy::Always;

    let mut table = String::from("| Payment | Date | Amount |\n|:---|:---:|---:|\n");
    for i in 1..=40 {
        table.push_str(&format!(
            "| Instalment {i} | 2024-{:02}-15 | ${},000.00 |\n",
            (i - 1) % 12 + 1,
            i * 5
        ));
    }

    LetterDefinition {
        config,
        blocks: vec![
            ContentBlock::text("# Payment schedule"),
            ContentBlock::text("Payments are issued on the dates below."),
            ContentBlock::text(table),
            ContentBlock::text("Contact the program office with any questions."),
        ],
    }
}
