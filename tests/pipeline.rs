use std::fs;

use worldcup_atlas::AnalysisError;
use worldcup_atlas::records::{Dataset, DirSource, Table, TableFiles, TableSource};
use worldcup_atlas::report::{ReferenceTables, build_report};

const MATCHES: &str = "\
Year,Datetime,Stage,Stadium,City,Home Team Name,Home Team Goals,Away Team Goals,Away Team Name,Win conditions,Attendance,MatchID
1966,11 Jul 1966,Group 1,Wembley Stadium,London,England,0,0,Uruguay,,87148,1
1966,30 Jul 1966,Final,Wembley Stadium,London,England,4,2,Germany FR,,96924,2
,,,,,,,,,,,
1970,21 Jun 1970,Final,Estadio Azteca,Mexico City,Brazil,4,1,Italy,,107412,3
1970,21 Jun 1970,Final,Estadio Azteca,Mexico City,Brazil,4,1,Italy,,107412,3
2006,09 Jun 2006,Group B,Waldstadion,Frankfurt,rn\">Trinidad and Tobago,0,0,Sweden,,62959,4
2014,12 Jun 2014,Group C,Arena Pernambuco,Recife,C\u{FFFD}te d'Ivoire,2,1,Japan,,40267,5
2014,15 Jun 2014,Group F,Arena Baixada,Curitiba,IR Iran,0,0,Nigeria,,39081,6
2014,21 Jun 2014,Group F,Estadio Mineirao,Belo Horizonte,Argentina,1,0,Iran,,57698,7
";

const PLAYERS: &str = "\
RoundID,MatchID,Team Initials,Coach Name,Line-up,Shirt Number,Player Name,Position,Event
1,2,ENG,RAMSEY Alf (ENG),S,10,HURST,,G18' G71' G80'
1,2,ENG,RAMSEY Alf (ENG),S,16,PETERS,,G78'
1,3,BRA,ZAGALLO (BRA),S,10,PEL\u{FFFD},,G18'
1,3,BRA,ZAGALLO (BRA),S,7,Jairzinho,,G71'
1,3,BRA,ZAGALLO (BRA),S,8,Gerson,,G66' Y50'
1,3,BRA,ZAGALLO (BRA),S,4,Carlos Alberto,,G86'
1,3,ITA,VALCAREGGI (ITA),S,11,Boninsegna,,G37'
1,3,ITA,VALCAREGGI (ITA),S,1,Albertosi,,
1,7,ARG,SABELLA (ARG),S,10,Messi,,G91'
";

const SUMMARIES: &str = "\
Year,Country,Winner,Runners-Up,Third,Fourth,GoalsScored,QualifiedTeams,MatchesPlayed,Attendance
1966,England,England,Germany FR,Portugal,Soviet Union,89,16,32,1.563.135
1970,Mexico,Brazil,Italy,Germany FR,Uruguay,95,16,32,1.603.975
";

const STADIUMS: &str = "\
label,latitude,longitude
Wembley Stadium (London),51.5560,-0.2796
Estadio Azteca (Mexico City),19.3029,-99.1505
";

fn write_dataset(dir: &std::path::Path) {
    fs::write(dir.join("WorldCupMatches.csv"), MATCHES).expect("write matches");
    fs::write(dir.join("WorldCupPlayers.csv"), PLAYERS).expect("write players");
    fs::write(dir.join("WorldCups.csv"), SUMMARIES).expect("write summaries");
    fs::write(dir.join("stadiums.csv"), STADIUMS).expect("write stadiums");
}

fn load() -> (Dataset, ReferenceTables) {
    let dir = tempfile::tempdir().expect("tempdir");
    write_dataset(dir.path());
    let dataset = Dataset::load(&DirSource::new(dir.path(), TableFiles::default()))
        .expect("dataset should load");
    let tables = ReferenceTables::load(Some(dir.path().join("stadiums.csv").as_path()), None, None)
        .expect("reference tables should load");
    (dataset, tables)
}

#[test]
fn loads_all_three_tables() {
    let (dataset, _) = load();
    assert_eq!(dataset.matches.len(), 7);
    assert_eq!(dataset.players.len(), 9);
    assert_eq!(dataset.summaries.len(), 2);
}

#[test]
fn stadiums_pair_finals_with_winners_and_positions() {
    let (dataset, tables) = load();
    let rows = tables.stadiums(&dataset).expect("stadiums");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].year, 1966);
    assert_eq!(rows[0].winner, "United Kingdom");
    assert_eq!(rows[0].stadium, "Wembley Stadium");
    assert_eq!(rows[0].latitude, 51.556);
    assert_eq!(rows[1].winner, "Brazil");
    assert_eq!(rows[1].attendance, 107412);
    assert_eq!(rows[1].longitude, -99.1505);
}

const EDITIONS: [(i32, &str); 20] = [
    (1930, "Uruguay"),
    (1934, "Italy"),
    (1938, "Italy"),
    (1950, "Uruguay"),
    (1954, "Germany FR"),
    (1958, "Brazil"),
    (1962, "Brazil"),
    (1966, "England"),
    (1970, "Brazil"),
    (1974, "Germany FR"),
    (1978, "Argentina"),
    (1982, "Italy"),
    (1986, "Argentina"),
    (1990, "Germany FR"),
    (1994, "Brazil"),
    (1998, "France"),
    (2002, "Brazil"),
    (2006, "Italy"),
    (2010, "Spain"),
    (2014, "Germany"),
];

/// Every edition summarized, but 1950 was decided by a final round with no
/// match labelled `Final`.
struct FullHistory;

impl TableSource for FullHistory {
    fn read_table(&self, table: Table) -> worldcup_atlas::Result<String> {
        let mut text = String::new();
        match table {
            Table::Matches => {
                text.push_str(MATCHES.lines().next().unwrap_or_default());
                text.push('\n');
                for (id, (year, _)) in EDITIONS.iter().enumerate() {
                    let stage = if *year == 1950 { "Final Round" } else { "Final" };
                    text.push_str(&format!(
                        "{year},,{stage},Ground {year},City,A,1,0,B,,{},{}\n",
                        50000 + id,
                        100 + id
                    ));
                }
            }
            Table::Players => text.push_str(PLAYERS),
            Table::Summaries => {
                text.push_str("Year,Country,Winner\n");
                for (year, winner) in EDITIONS {
                    text.push_str(&format!("{year},Host,{winner}\n"));
                }
            }
        }
        Ok(text)
    }
}

#[test]
fn embedded_stadium_table_joins_full_history_by_year() {
    let dataset = Dataset::load(&FullHistory).expect("full history loads");
    assert_eq!(dataset.summaries.len(), 20);

    let tables = ReferenceTables::load(None, None, None).expect("embedded tables");
    let rows = tables.stadiums(&dataset).expect("finals join the embedded table");

    assert_eq!(rows.len(), 19);
    assert!(rows.iter().all(|r| r.year != 1950));
    assert_eq!(rows[0].year, 1930);
    assert_eq!(rows[0].winner, "Uruguay");
    assert_eq!(rows[3].year, 1954);
    assert_eq!(rows[3].winner, "Germany");
    let last = rows.last().expect("2014 final");
    assert_eq!(last.year, 2014);
    assert_eq!(last.stadium, "Ground 2014");

    let maracana = tables
        .stadium_coordinates
        .by_year()
        .expect("unique years")
        .expect("keyed table")[&2014]
        .coordinates;
    assert_eq!((last.latitude, last.longitude), (maracana.latitude, maracana.longitude));

    let map = worldcup_atlas::render::build_map(&rows, &[], &tables.flags).expect("map");
    assert_eq!(map.layers[0].markers.len(), 19);
}

#[test]
fn country_goals_are_cleaned_and_patched() {
    let (dataset, tables) = load();
    let rows = tables.country_goals(&dataset).expect("country goals");

    let find = |name: &str| {
        rows.iter()
            .find(|r| r.totals.country == name)
            .unwrap_or_else(|| panic!("missing {}", name))
    };

    assert_eq!(find("Brazil").totals.total_goals, 4);
    assert_eq!(find("England").totals.home_goals, 4);
    assert_eq!(find("Germany FR").totals.away_goals, 2);
    assert_eq!(find("Trinidad and Tobago").totals.total_goals, 0);
    assert_eq!(find("Côte d'Ivoire").totals.home_goals, 2);
    assert_eq!(find("Iran").totals.total_goals, 0);
    assert!(find("Iran").coordinates.is_some());
    assert!(rows.iter().all(|r| !r.totals.country.contains('\u{FFFD}')));
    assert!(rows.iter().all(|r| r.totals.country != "IR Iran"));
    assert!(rows
        .iter()
        .all(|r| r.totals.total_goals == r.totals.home_goals + r.totals.away_goals));
    assert!(rows.windows(2).all(|w| w[0].totals.total_goals >= w[1].totals.total_goals));
}

#[test]
fn top_scorers_are_ranked_and_corrected() {
    let (dataset, tables) = load();
    let rows = tables.top_scorers(&dataset, 5).expect("scorers");
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].player, "HURST");
    assert_eq!(rows[0].goals, 3);
    assert_eq!(rows[1].player, "PETERS");
    assert_eq!(rows[2].player, "PELÉ");
    assert_eq!(rows[3].player, "JAIRZINHO");

    let err = tables.top_scorers(&dataset, 16).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidRange { .. }));
}

#[test]
fn report_serializes_every_payload() {
    let (dataset, tables) = load();
    let report = build_report(&dataset, &tables, 5).expect("report");
    assert_eq!(report.map.layers[0].markers.len(), 2);
    assert!(report.map.layers[0].markers[0].popup_html.contains("🇬🇧"));
    assert!(report.map.layers[1].markers.len() >= 10);
    assert_eq!(report.charts.len(), 2);

    let json = serde_json::to_value(&report).expect("report serializes");
    assert_eq!(json["stadiums"][1]["winner"], "Brazil");
    assert_eq!(json["top_scorers"][0]["goals"], 3);
    assert_eq!(json["charts"][1]["kind"], "column");
    assert!(json["country_goals"][0]["coordinates"]["latitude"].is_number());
}

#[test]
fn report_is_repeatable() {
    let (dataset, tables) = load();
    let first = build_report(&dataset, &tables, 6).expect("first");
    let second = build_report(&dataset, &tables, 6).expect("second");
    assert_eq!(first.stadiums, second.stadiums);
    assert_eq!(first.country_goals, second.country_goals);
    assert_eq!(first.top_scorers, second.top_scorers);
    assert_eq!(first.map, second.map);
}

struct MissingTables;

impl TableSource for MissingTables {
    fn read_table(&self, table: Table) -> worldcup_atlas::Result<String> {
        match table {
            Table::Matches => Ok(MATCHES.to_string()),
            _ => Ok("Nothing,Here\n1,2\n".to_string()),
        }
    }
}

#[test]
fn absent_columns_surface_as_missing_data() {
    let err = Dataset::load(&MissingTables).unwrap_err();
    assert!(matches!(err, AnalysisError::MissingData(_)));
}

#[test]
fn missing_directory_is_an_io_error() {
    let source = DirSource::new("/definitely/not/here", TableFiles::default());
    let err = Dataset::load(&source).unwrap_err();
    assert!(matches!(err, AnalysisError::Io { .. }));
}
