//! Plain-text rendering of list pages.

use incidence_map_manager::ListView;

/// Prints `view` as a table followed by the pagination state.
pub fn print_list(view: &ListView) {
    if view.items.is_empty() {
        println!("No incidences found.");
        if view.total_pages > 0 {
            println!("(page {} of {})", view.page, view.total_pages);
        }
        return;
    }

    println!(
        "{:<11} {:<15} {:<6} {:<14} {:<12} {:<30} {}",
        "ID", "TYPE", "URG", "DATE", "DETAIL", "DESCRIPTION", "ADDRESS"
    );
    println!("{}", "-".repeat(110));

    for item in &view.items {
        println!(
            "{:<11} {:<15} {:<6} {:<14} {:<12} {:<30} {}",
            item.id.as_str(),
            item.kind.label(),
            item.urgency_glyph,
            item.formatted_date,
            truncate(&item.detail_value, 11),
            truncate(&item.description, 29),
            item.address.as_deref().unwrap_or("-"),
        );
    }

    println!();
    println!(
        "Page {} of {} ({} incidence(s)){}{}",
        view.page,
        view.total_pages,
        view.total_items,
        if view.is_first { "" } else { "  [prev]" },
        if view.is_last { "" } else { "  [next]" },
    );
}

/// Truncates `s` to at most `max` characters, appending `…` when cut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("12.5 m²", 11), "12.5 m²");
        assert_eq!(truncate("Contenedor desbordado", 10), "Contenedo…");
        assert_eq!(truncate("áéíóú", 3), "áé…");
    }
}
