//! Localized labels for tag names and display rows.
//!
//! Only keys are translated, values are never touched. Unknown languages and unknown keys
//! pass through unchanged.

use super::TagMap;

/// Tag name → German label.
const TAGS_DE: &[(&str, &str)] = &[
    ("Image Width", "Breite"),
    ("Image Height", "Höhe"),
    ("MIME Type", "MIME-Type"),
    ("Format", "Bildformat"),
    ("Image Description", "Bildbeschreibung"),
    ("Caption-Abstract", "Abstrakte Beschreibung"),
    ("Description", "Beschreibung"),
    ("Copyright", "Copyright"),
    ("Copyright Notice", "Copyright Hinweis"),
    ("Rights", "Copyright Rechte"),
    ("URL", "Copyright URL"),
    ("Usage Terms", "Nutzungsbedingungen"),
    ("Copyright Flag", "Copyright Flag"),
    ("Keywords", "Schlüsselworte"),
    ("Subject", "Tags"),
    ("Creator", "Ersteller"),
    ("Artist", "Künstler"),
    ("By-line", "Urheber"),
    ("Authors Position", "Autor-Position"),
    ("By-line Title", "Autor-Anrede"),
    ("Creator Address", "Autor-Adresse"),
    ("Creator City", "Autor Stadt"),
    ("Creator Region", "Autor Region"),
    ("Creator Postal Code", "Autor PLZ"),
    ("Creator Country", "Autor Land"),
    ("Creator Work Telephone", "Autor Telefon"),
    ("Creator Work Email", "Autor EMail"),
    ("Creator Work URL", "Autor-Webadressen"),
    ("Location", "Bild-Standort"),
    ("Sub-location", "Bild-Substandort"),
    ("State", "Bild-Region"),
    ("Province-State", "Bild-Bundesland/Kanton"),
    ("Country Code", "Bild-Landeskennung"),
    ("Country-Primary Location Code", "Bild-Ländercode"),
    ("City", "Bild-Stadt"),
    ("Country", "Bild-Land"),
    ("Country-Primary Location Name", "Bild-Landesname"),
    ("Intellectual Genre", "Bild-Genre"),
    ("Scene", "Bild-Szene"),
    ("Modify Date", "Änderungsdatum"),
    ("Date/Time Original", "Datum/Zeit original"),
    ("Create Date", "Erstellungszeitpunkt"),
    ("Date Created", "Zeitpunkt Erstellung"),
    ("Date/Time Created", "Erstellungs Datum/Zeit"),
    ("Digital Creation Date/Time", "Dig. Erstellungs Datum/Zeit"),
    ("Digital Creation Date", "Digit. Erstellungs Datum"),
    ("Digital Creation Time", "Digit. Erstellungs Zeit"),
    ("Instructions", "Anweisungen"),
    ("Special Instructions", "Spez. Anweisungen"),
    ("Transmission Reference", "Jobkennung"),
    ("Original Transmission Reference", "Orig. Jobkennung"),
    ("Credit", "Anbieter"),
    ("Source", "Quelle"),
    ("GPS Latitude", "GPS-Breite"),
    ("GPS Longitude", "GPS-Länge"),
    ("GPS Position", "GPS-Position"),
    ("GPS Latitude Ref", "GPS-Breiten Ref."),
    ("GPS Longitude Ref", "GPS-Längen Ref."),
    ("Object Name", "Objektname"),
    ("Object-Name", "Objekt-Name"),
    ("Label", "Label"),
    ("Title", "Titel"),
    ("Headline", "Kopfzeile"),
    ("Category", "Kategorie"),
    ("Supplemental Categories", "Zusätzliche Kategorien"),
    ("Make", "Hersteller"),
    ("Camera Model Name", "Kamera-Modell"),
    ("Exposure Time", "Belichtungszeit"),
    ("Shutter Speed Value", "Belichtungszeitwert"),
    ("Shutter Speed", "Zeit Belichtung"),
    ("F Number", "Blende"),
    ("Aperture Value", "Blendenwert"),
    ("ISO", "ISO"),
    ("Lens ID", "Objektiv"),
    ("Lens Info", "Objektivinfo"),
    ("Exposure Program", "Belichtungsprogramm"),
    ("Exposure Compensation", "Belichtungskompens."),
    ("Metering Mode", "Messmodus"),
    ("Flash", "Blitz"),
    ("Focal Length", "Brennweite"),
    ("Exposure Mode", "Belichtungsmodus"),
    ("Caption Writer", "Autor-Beschreibung"),
    ("Writer-Editor", "Verfasser"),
];

/// Row labels of [`ImageInfo::to_info_map`](super::ImageInfo::to_info_map) and
/// [`ImageInfo::to_metadata_map`](super::ImageInfo::to_metadata_map) that are not tag names.
const DISPLAY_DE: &[(&str, &str)] = &[
    ("Author", "Autor"),
    ("Date", "Datum"),
    ("Camera", "Kamera"),
    ("Lens", "Objektiv"),
    ("Aperture", "Blende"),
    ("Exposure", "Belichtungszeit"),
    ("Last Modified", "Datum - Letzte Änderung"),
    ("Created", "Datum - Erstellung"),
    ("Digitized", "Datum - Digitalisierung"),
    ("Author Country", "Autor - Land"),
    ("Author URLs", "Autor - URLs"),
    ("Location City", "Location - Stadt"),
    ("Location Region", "Location - Region"),
    ("Location State", "Location - Bundesland"),
    ("Location Country Code", "Location - Ländercode"),
    ("Location Country", "Location - Land"),
    ("Other Categories", "Andere Kategorien"),
    ("Model", "Modell"),
];

fn table(lang: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match lang.to_ascii_lowercase().as_str() {
        "de" | "de-de" | "de_de" | "de-at" | "de-ch" => Some(TAGS_DE),
        _ => None,
    }
}

/// `true` if tag labels exist for `lang`.
pub fn is_supported(lang: &str) -> bool {
    table(lang).is_some()
}

/// Replace the English tag names of `tags` by their labels in `lang`.
pub fn localize(tags: &TagMap, lang: &str) -> TagMap {
    let Some(table) = table(lang) else {
        return tags.clone();
    };
    tags.iter()
        .map(|(key, value)| {
            let label = lookup(table, key).unwrap_or(key.as_str());
            (label.to_string(), value.clone())
        })
        .collect()
}

/// Inverse of [`localize`]: map labels in `lang` back to English tag names.
pub fn delocalize(tags: &TagMap, lang: &str) -> TagMap {
    let Some(table) = table(lang) else {
        return tags.clone();
    };
    tags.iter()
        .map(|(label, value)| {
            let key = table
                .iter()
                .find(|(_, l)| *l == label.as_str())
                .map(|(k, _)| *k)
                .unwrap_or(label.as_str());
            (key.to_string(), value.clone())
        })
        .collect()
}

/// Translate a display row label (tag name or one of the summary labels).
pub fn localize_label<'a>(label: &'a str, lang: &str) -> &'a str {
    let Some(tags) = table(lang) else {
        return label;
    };
    lookup(DISPLAY_DE, label)
        .or_else(|| lookup(tags, label))
        .unwrap_or(label)
}

fn lookup<'a>(table: &'static [(&'static str, &'static str)], key: &'a str) -> Option<&'a str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, label)| *label)
}
