use crate::grid::{ColumnDef, ColumnGroup, FilterKind, FilterParams, FilterValue, GridOptions, RowGroupPanelShow};

use super::{GridSpec, PageSpec, RowExclusion, DEFAULT_MOUNT_ID};

const WIN_HIGHLIGHT: &str = "#D0F8AB";

pub fn tor_game_log() -> PageSpec {
    // Numeric range filter by default; text columns opt into "contains".
    let mut options = GridOptions::grouped_log(RowGroupPanelShow::Always, 2)
        .blank_nulls()
        .default_filter(
            FilterValue::Kind(FilterKind::Number),
            Some(FilterParams::numeric_range()),
        );
    options.group_display_type = None;
    options.group_row_renderer_params = None;

    let columns = vec![
        ColumnDef::grouping("Season").header("Season").tooltip("Season").into(),
        ColumnDef::grouping("Gm Type").header("Gm Type").tooltip("Game Type").into(),
        ColumnDef::number("GM").header("GM #").tooltip("Game Number").into(),
        ColumnDef::date("Game Date").header("Date").tooltip("Game Date").link().into(),
        ColumnDef::category("At").tooltip("Location").into(),
        ColumnDef::category("Opp").header("Opp").tooltip("Opponent").link().into(),
        ColumnGroup::new(
            "Score",
            vec![
                ColumnDef::number("Tm Sc").header("Tm").tooltip("Team Score").sum(),
                ColumnDef::number("Opp Sc").header("Opp").tooltip("Opponent Score").sum(),
            ],
        )
        .into(),
        ColumnDef::category("Result").highlight_when("W", WIN_HIGHLIGHT).into(),
        ColumnDef::category("OT").tooltip("Overtime Result").into(),
        ColumnGroup::new(
            "Shots",
            vec![
                ColumnDef::number("Tm Shots").header("Tm").tooltip("Team Shots").sum(),
                ColumnDef::number("Opp Shots").header("Opp").tooltip("Opponent Shots").sum(),
            ],
        )
        .into(),
        // Each header names its own field: "Op" columns hold opportunities,
        // "G" columns goals. Older builds of this page had the pairs swapped.
        ColumnGroup::new(
            "Power Play",
            vec![
                ColumnDef::new("PP Tm Op")
                    .header("Tm Op")
                    .tooltip("Team Power Play Opportunities")
                    .sum(),
                ColumnDef::new("PP Tm G")
                    .header("Tm G")
                    .tooltip("Team Power Play Goals")
                    .sum(),
                ColumnDef::new("PP Opp Op")
                    .header("Opp Op")
                    .tooltip("Opponent Power Play Opportunities")
                    .sum(),
                ColumnDef::new("PP Opp G")
                    .header("Opp G")
                    .tooltip("Opponent Power Play Goals")
                    .sum(),
            ],
        )
        .into(),
        ColumnDef::category("Starter").link().into(),
        ColumnDef::category("ScF").header("Sc F").tooltip("Scored First").into(),
        ColumnGroup::new(
            "Big Lead",
            vec![
                ColumnDef::number("BL Tm G").header("Tm G").tooltip("Team Big Lead").sum(),
                ColumnDef::number("BL Opp G").header("Opp G").tooltip("Opponent Big Lead").sum(),
            ],
        )
        .into(),
        ColumnGroup::new(
            "TM Goals by Period",
            vec![
                ColumnDef::number("Tm P1").header("P1").tooltip("Team First Period Goals").sum(),
                ColumnDef::number("Tm P2").header("P2").tooltip("Team Second Period Goals").sum(),
            ],
        )
        .into(),
        ColumnGroup::new(
            "OPP Goals by Period",
            vec![
                ColumnDef::number("Opp P1").header("P1").tooltip("Opponent First Period Goals").sum(),
                ColumnDef::number("Opp P2").header("P2").tooltip("Opponent Second Period Goals").sum(),
            ],
        )
        .into(),
        ColumnGroup::new(
            "Time Played",
            vec![
                ColumnDef::text("Lead").header("Lead").tooltip("Time Played with Lead").text_filter(),
                ColumnDef::text("Tied").header("Tied").tooltip("Time Played Tied").text_filter(),
                ColumnDef::text("Trail").header("Trail").tooltip("Time Played Trailing").text_filter(),
            ],
        )
        .into(),
    ];

    PageSpec::new(
        "nhl/team/tor/gamelog",
        "TOR Game Log",
        vec![GridSpec::new(
            DEFAULT_MOUNT_ID,
            &[
                "/data/TOR_GameLog_2024_v3.json",
                "/data/TOR_GameLog_2023_v2.json",
                "/data/TOR_GameLog_2022_v1.json",
                "/data/TOR_GameLog_2021_v1.json",
            ],
            options,
            columns,
        )],
    )
}

pub fn tor_roster() -> PageSpec {
    let summary_rows = ["TEAM", "OPPONENTS"];

    let goalies = GridSpec::new(
        "goaliesGrid",
        &["/data/TOR_TREP_Goalies_2024_v1.json"],
        GridOptions::roster(),
        vec![
            ColumnDef::new("GOALKEEPER").header("Goalkeeper").basic().into(),
            ColumnDef::new("G").header("Games").basic().into(),
            ColumnDef::new("GS").header("Games Started").basic().into(),
            ColumnDef::new("W").header("Wins").basic().into(),
            ColumnDef::new("L").header("Losses").basic().into(),
            ColumnDef::new("OT").header("OT").basic().into(),
            ColumnDef::new("GAA").header("GAA").basic().into(),
            ColumnDef::new("SV%").header("SV%").basic().into(),
            ColumnDef::new("SHO").header("Shutouts").basic().into(),
        ],
    )
    .excluding(RowExclusion::new("GOALKEEPER", &summary_rows));

    let skaters = GridSpec::new(
        "skatersGrid",
        &["/data/TOR_TREP_Skaters_2024_v1.json"],
        GridOptions::roster(),
        vec![
            ColumnDef::new("PLAYER").header("Player").basic().into(),
            ColumnDef::new("POS").header("Position").basic().into(),
            ColumnDef::new("GP").header("Games").basic().into(),
            ColumnDef::new("G").header("Goals").basic().into(),
            ColumnDef::new("A").header("Assists").basic().into(),
            ColumnDef::new("PTS").header("Points").basic().into(),
            ColumnDef::new("+/-").header("+/-").basic().into(),
            ColumnDef::new("PIM").header("PIM").basic().into(),
            ColumnDef::new("TOI PER G").header("TOI/G").basic().into(),
        ],
    )
    .excluding(RowExclusion::new("PLAYER", &summary_rows));

    PageSpec::new("nhl/team/tor/roster", "TOR Roster", vec![goalies, skaters])
}
