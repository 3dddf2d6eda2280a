use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

/// School code to school name, iterated in ascending code order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchoolCodeTable {
    schools: BTreeMap<String, String>,
}

impl SchoolCodeTable {
    pub fn from_pairs<I, C, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: Into<String>,
        N: Into<String>,
    {
        Self { schools: pairs.into_iter().map(|(code, name)| (code.into(), name.into())).collect() }
    }

    /// The table compiled into the binary.
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.schools.get(code).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.schools.iter().map(|(code, name)| (code.as_str(), name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.schools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }
}

static BUILTIN: LazyLock<Arc<SchoolCodeTable>> =
    LazyLock::new(|| Arc::new(SchoolCodeTable::from_pairs(SCHOOL_CODES.iter().copied())));

const SCHOOL_CODES: &[(&str, &str)] = &[
    ("1001", "ADMIRALTY PRIMARY SCHOOL"),
    ("1002", "AHMAD IBRAHIM PRIMARY SCHOOL"),
    ("1003", "AI TONG SCHOOL"),
    ("1004", "ALEXANDRA PRIMARY SCHOOL"),
    ("1005", "ANCHOR GREEN PRIMARY SCHOOL"),
    ("1006", "ANDERSON PRIMARY SCHOOL"),
    ("1007", "ANG MO KIO PRIMARY SCHOOL"),
    ("1008", "ANGLO-CHINESE SCHOOL (JUNIOR)"),
    ("1009", "BEDOK GREEN PRIMARY SCHOOL"),
    ("1010", "BENDEMEER PRIMARY SCHOOL"),
    ("1011", "BLANGAH RISE PRIMARY SCHOOL"),
    ("1012", "BOON LAY GARDEN PRIMARY SCHOOL"),
    ("1013", "BUKIT PANJANG PRIMARY SCHOOL"),
    ("1014", "BUKIT TIMAH PRIMARY SCHOOL"),
    ("1015", "CANBERRA PRIMARY SCHOOL"),
    ("1016", "CHONGFU SCHOOL"),
    ("1017", "CLEMENTI PRIMARY SCHOOL"),
    ("1018", "CORAL PRIMARY SCHOOL"),
    ("1019", "DE LA SALLE SCHOOL"),
    ("1020", "EAST SPRING PRIMARY SCHOOL"),
    ("1021", "FERN GREEN PRIMARY SCHOOL"),
    ("1022", "GONGSHANG PRIMARY SCHOOL"),
    ("1023", "HENRY PARK PRIMARY SCHOOL"),
    ("1024", "JURONG PRIMARY SCHOOL"),
    ("1025", "KEMING PRIMARY SCHOOL"),
    ("1026", "LAKESIDE PRIMARY SCHOOL"),
    ("1027", "MARYMOUNT CONVENT SCHOOL"),
    ("1028", "NAN HUA PRIMARY SCHOOL"),
    ("1029", "NORTH VISTA PRIMARY SCHOOL"),
    ("1030", "PEI HWA PRESBYTERIAN PRIMARY SCHOOL"),
    ("1031", "QIFA PRIMARY SCHOOL"),
    ("1032", "RED SWASTIKA SCHOOL"),
    ("1033", "ROSYTH SCHOOL"),
    ("1034", "TAMPINES PRIMARY SCHOOL"),
    ("1035", "WEST GROVE PRIMARY SCHOOL"),
    ("1036", "YEW TEE PRIMARY SCHOOL"),
    ("3001", "ANG MO KIO SECONDARY SCHOOL"),
    ("3002", "ANGLO-CHINESE SCHOOL (BARKER ROAD)"),
    ("3003", "BEDOK SOUTH SECONDARY SCHOOL"),
    ("3004", "BUKIT PANJANG GOVERNMENT HIGH SCHOOL"),
    ("3005", "CATHOLIC HIGH SCHOOL"),
    ("3006", "CHIJ ST. THERESA'S CONVENT"),
    ("3007", "CLEMENTI TOWN SECONDARY SCHOOL"),
    ("3008", "CRESCENT GIRLS' SCHOOL"),
    ("3009", "DUNMAN HIGH SCHOOL"),
    ("3010", "HWA CHONG INSTITUTION"),
    ("3011", "JURONG WEST SECONDARY SCHOOL"),
    ("3012", "NAN HUA HIGH SCHOOL"),
    ("3013", "NANYANG GIRLS' HIGH SCHOOL"),
    ("3014", "RAFFLES GIRLS' SCHOOL (SECONDARY)"),
    ("3015", "RAFFLES INSTITUTION"),
    ("3016", "RIVER VALLEY HIGH SCHOOL"),
    ("3017", "TAMPINES SECONDARY SCHOOL"),
    ("3018", "VICTORIA SCHOOL"),
    ("3019", "YISHUN TOWN SECONDARY SCHOOL"),
    ("0701", "ANDERSON SERANGOON JUNIOR COLLEGE"),
    ("0702", "CATHOLIC JUNIOR COLLEGE"),
    ("0703", "EUNOIA JUNIOR COLLEGE"),
    ("0704", "JURONG PIONEER JUNIOR COLLEGE"),
    ("0705", "NATIONAL JUNIOR COLLEGE"),
    ("0706", "TEMASEK JUNIOR COLLEGE"),
    ("0707", "VICTORIA JUNIOR COLLEGE"),
];

#[cfg(test)]
mod tests {
    use super::SchoolCodeTable;

    #[test]
    fn builtin_table_is_populated_and_keyed_by_four_digit_codes() {
        let table = SchoolCodeTable::builtin();

        assert!(!table.is_empty());
        assert!(table.iter().all(|(code, _)| code.len() == 4
            && code.chars().all(|ch| ch.is_ascii_digit())));
        assert_eq!(table.get("3015"), Some("RAFFLES INSTITUTION"));
    }

    #[test]
    fn iteration_is_ordered_by_code() {
        let table = SchoolCodeTable::from_pairs([("2000", "B"), ("0100", "A"), ("1500", "C")]);
        let codes = table.iter().map(|(code, _)| code).collect::<Vec<_>>();

        assert_eq!(codes, vec!["0100", "1500", "2000"]);
    }
}
