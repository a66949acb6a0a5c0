// /src/menu.rs
//
// Builds SMS-sized listing pages from a catalog of numbered titles. Each
// page carries the header, a `\r\n`-joined run of `index:title` entries
// and a `Page i/n` footer, padded to exactly `SMS_PAGE_LENGTH` characters
// so every page costs one message.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::constants::{MAX_MENU_PAGES, SMS_PAGE_LENGTH};

const PAGE_PADDING: &str = "\r\n\r\n";
const FOOTER_PROBE: &str = "Page 1/1";

/// Splits `entries` into SMS pages. At most [`MAX_MENU_PAGES`] pages are
/// produced; entries beyond that are dropped.
pub fn paginate(
    entries: &[(u32, &str)],
    header: &str,
) -> Vec<String<SMS_PAGE_LENGTH>, MAX_MENU_PAGES> {
    // Room left for entry lines once header, paddings and footer are paid for.
    let header_footer_len = header.len() + FOOTER_PROBE.len() + 4;
    let max_body_len =
        SMS_PAGE_LENGTH.saturating_sub(header_footer_len + PAGE_PADDING.len() * 2);

    // First pass: greedy page breaks over entry lengths.
    let mut ranges: Vec<(usize, usize), MAX_MENU_PAGES> = Vec::new();
    let mut start = 0;
    let mut body_len = 0;
    for (i, (index, title)) in entries.iter().enumerate() {
        let entry_len = decimal_len(*index) + 1 + title.len() + 2;
        if i > start && body_len + entry_len > max_body_len {
            if ranges.push((start, i)).is_err() {
                return render(entries, header, &ranges);
            }
            start = i;
            body_len = 0;
        }
        body_len += entry_len;
    }
    if start < entries.len() {
        let _ = ranges.push((start, entries.len()));
    }

    render(entries, header, &ranges)
}

fn render(
    entries: &[(u32, &str)],
    header: &str,
    ranges: &[(usize, usize)],
) -> Vec<String<SMS_PAGE_LENGTH>, MAX_MENU_PAGES> {
    let total = ranges.len();
    let mut pages = Vec::new();
    for (page_no, (start, end)) in ranges.iter().enumerate() {
        let mut scratch: String<{ SMS_PAGE_LENGTH + 96 }> = String::new();
        let _ = write!(scratch, "{}{}\r\n", header, PAGE_PADDING);
        for (i, (index, title)) in entries[*start..*end].iter().enumerate() {
            if i > 0 {
                let _ = scratch.push_str("\r\n");
            }
            let _ = write!(scratch, "{}:{}", index, title);
        }
        let _ = write!(scratch, "{}\r\nPage {}/{}", PAGE_PADDING, page_no + 1, total);

        // Truncate or space-pad to the exact page size.
        let mut page: String<SMS_PAGE_LENGTH> = String::new();
        for c in scratch.chars() {
            if page.push(c).is_err() {
                break;
            }
        }
        while page.push(' ').is_ok() {}
        let _ = pages.push(page);
    }
    pages
}

fn decimal_len(mut n: u32) -> usize {
    let mut len = 1;
    while n >= 10 {
        n /= 10;
        len += 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::paginate;
    use crate::constants::SMS_PAGE_LENGTH;

    const HEADER: &str = "==Song List==";

    #[test]
    fn single_page_carries_header_entries_and_footer() {
        let pages = paginate(&[(1, "First"), (2, "Second")], HEADER);
        assert_eq!(pages.len(), 1);
        let page = pages[0].as_str();
        assert!(page.starts_with("==Song List==\r\n\r\n\r\n1:First\r\n2:Second"));
        assert!(page.contains("Page 1/1"));
    }

    #[test]
    fn every_page_is_exactly_one_sms() {
        let entries: std::vec::Vec<(u32, std::string::String)> = (1..=30)
            .map(|i| (i, format!("Track number {i}")))
            .collect();
        let borrowed: std::vec::Vec<(u32, &str)> =
            entries.iter().map(|(i, t)| (*i, t.as_str())).collect();
        let pages = paginate(&borrowed, HEADER);
        assert!(pages.len() > 1);
        for page in &pages {
            assert_eq!(page.len(), SMS_PAGE_LENGTH);
        }
    }

    #[test]
    fn footer_counts_all_pages() {
        let entries: std::vec::Vec<(u32, std::string::String)> = (1..=30)
            .map(|i| (i, format!("Track number {i}")))
            .collect();
        let borrowed: std::vec::Vec<(u32, &str)> =
            entries.iter().map(|(i, t)| (*i, t.as_str())).collect();
        let pages = paginate(&borrowed, HEADER);
        let total = pages.len();
        let last = pages.last().unwrap();
        assert!(last.contains(&format!("Page {total}/{total}")));
    }

    #[test]
    fn no_entries_yields_no_pages() {
        let pages = paginate(&[], HEADER);
        assert!(pages.is_empty());
    }
}
