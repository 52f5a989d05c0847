use crate::domain::{BakeryRecord, RawPoiRecord};

use super::Locale;
use super::locale::localize_hours;

/// Map a raw POI tag set onto a bakery record
///
/// Pure: no I/O, missing tags are simply absent. The distance is left at 0
/// for the ranker to fill in.
pub fn normalize(raw: &RawPoiRecord, locale: Locale) -> BakeryRecord {
    BakeryRecord {
        name: resolve_name(raw, locale),
        coordinate: raw.coordinate,
        address: resolve_address(raw),
        opening_hours: resolve_opening_hours(raw, locale),
        distance_meters: 0.0,
    }
}

/// Blank name tags count as absent, so the name is never empty
fn resolve_name(raw: &RawPoiRecord, locale: Locale) -> String {
    let present = |key: &str| raw.tag(key).filter(|name| !name.trim().is_empty());

    present(locale.name_tag())
        .or_else(|| present("name"))
        .unwrap_or(locale.unnamed())
        .to_string()
}

/// First rule whose primary tag exists wins:
/// 1. `addr:street` (+ `, addr:housenumber`)
/// 2. `addr:place` (+ `, addr:housenumber`)
/// 3. `addr:full` verbatim
fn resolve_address(raw: &RawPoiRecord) -> Option<String> {
    let with_number = |primary: &str| match raw.tag("addr:housenumber") {
        Some(number) => format!("{primary}, {number}"),
        None => primary.to_string(),
    };

    if let Some(street) = raw.tag("addr:street") {
        return Some(with_number(street));
    }
    if let Some(place) = raw.tag("addr:place") {
        return Some(with_number(place));
    }
    raw.tag("addr:full").map(str::to_string)
}

fn resolve_opening_hours(raw: &RawPoiRecord, locale: Locale) -> Option<String> {
    raw.tag("opening_hours")
        .filter(|hours| !hours.trim().is_empty())
        .map(|hours| localize_hours(hours, locale.hours_table()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use std::collections::HashMap;

    fn raw(tags: &[(&str, &str)]) -> RawPoiRecord {
        let tags: HashMap<String, String> = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RawPoiRecord::new(Coordinate::new(50.45, 30.52), tags)
    }

    #[test]
    fn test_name_prefers_localized_tag() {
        let record = normalize(
            &raw(&[("name", "Bread House"), ("name:uk", "Хлібний дім")]),
            Locale::Uk,
        );
        assert_eq!(record.name, "Хлібний дім");

        let record = normalize(
            &raw(&[("name", "Хлібний дім"), ("name:en", "Bread House")]),
            Locale::En,
        );
        assert_eq!(record.name, "Bread House");
    }

    #[test]
    fn test_name_falls_back_to_generic_then_placeholder() {
        assert_eq!(normalize(&raw(&[("name", "Булочна")]), Locale::Uk).name, "Булочна");
        assert_eq!(normalize(&raw(&[]), Locale::Uk).name, "Пекарня без назви");
        assert_eq!(normalize(&raw(&[]), Locale::En).name, "Bakery without a name");
    }

    #[test]
    fn test_blank_name_tags_are_skipped() {
        let record = normalize(&raw(&[("name:uk", ""), ("name", "Булочна")]), Locale::Uk);
        assert_eq!(record.name, "Булочна");

        let record = normalize(&raw(&[("name:uk", "  "), ("name", "\t")]), Locale::Uk);
        assert_eq!(record.name, "Пекарня без назви");

        let record = normalize(&raw(&[("name", "")]), Locale::En);
        assert_eq!(record.name, "Bakery without a name");
    }

    #[test]
    fn test_tag_keys_are_case_sensitive() {
        let record = normalize(&raw(&[("Name", "Ignored"), ("ADDR:FULL", "x")]), Locale::Uk);
        assert_eq!(record.name, "Пекарня без назви");
        assert_eq!(record.address, None);
    }

    #[test]
    fn test_address_street_with_number() {
        let record = normalize(
            &raw(&[
                ("addr:street", "Хрещатик"),
                ("addr:housenumber", "22"),
                ("addr:place", "Майдан"),
                ("addr:full", "Київ, Хрещатик 22"),
            ]),
            Locale::Uk,
        );
        assert_eq!(record.address.as_deref(), Some("Хрещатик, 22"));
    }

    #[test]
    fn test_address_street_without_number() {
        let record = normalize(&raw(&[("addr:street", "Хрещатик")]), Locale::Uk);
        assert_eq!(record.address.as_deref(), Some("Хрещатик"));
    }

    #[test]
    fn test_address_place_beats_full() {
        let record = normalize(
            &raw(&[
                ("addr:place", "Контрактова площа"),
                ("addr:housenumber", "4"),
                ("addr:full", "somewhere"),
            ]),
            Locale::Uk,
        );
        assert_eq!(record.address.as_deref(), Some("Контрактова площа, 4"));
    }

    #[test]
    fn test_address_full_verbatim() {
        let record = normalize(&raw(&[("addr:full", "вул. Січових Стрільців, 12А")]), Locale::Uk);
        assert_eq!(record.address.as_deref(), Some("вул. Січових Стрільців, 12А"));
    }

    #[test]
    fn test_address_unset_without_tags() {
        let record = normalize(&raw(&[("addr:housenumber", "7"), ("shop", "bakery")]), Locale::Uk);
        assert_eq!(record.address, None);
    }

    #[test]
    fn test_opening_hours() {
        let record = normalize(
            &raw(&[("opening_hours", "Mo-Fr 08:00-18:00; Su off")]),
            Locale::Uk,
        );
        assert_eq!(
            record.opening_hours.as_deref(),
            Some("Пн-Пт 08:00-18:00; Нд Вихідний")
        );

        assert_eq!(normalize(&raw(&[]), Locale::Uk).opening_hours, None);
        assert_eq!(
            normalize(&raw(&[("opening_hours", "  ")]), Locale::Uk).opening_hours,
            None
        );
    }

    #[test]
    fn test_keeps_coordinate_and_zero_distance() {
        let record = normalize(&raw(&[("name", "x")]), Locale::Uk);
        assert_eq!(record.coordinate, Coordinate::new(50.45, 30.52));
        assert_eq!(record.distance_meters, 0.0);
    }
}
