use crate::grid::{
    AutoSizeStrategy, ColumnDef, ColumnGroup, GridOptions, GroupRowRendererParams, Pinned,
    RowGroupPanelShow,
};

use super::{GridSpec, PageSpec, DEFAULT_MOUNT_ID};

fn stat(field: &str, tooltip: &str) -> ColumnDef {
    ColumnDef::number(field).header(field).tooltip(tooltip).number_filter()
}

pub fn mitch_game_log() -> PageSpec {
    let mut options = GridOptions::grouped_log(RowGroupPanelShow::Always, 2).blank_nulls();
    options.auto_size_strategy = Some(AutoSizeStrategy::FitGridWidth);
    options.default_col_def.floating_filter = Some(false);
    options.group_row_renderer_params = None;

    let columns = vec![
        ColumnDef::grouping("Season").header("Season").tooltip("Season").into(),
        ColumnDef::grouping("Type").header("Gm Type").tooltip("Game Type").into(),
        ColumnDef::new("Date").header("Date").tooltip("Game Date").into(),
        ColumnDef::category("Team").header("Team").tooltip("Team").link().into(),
        ColumnDef::category("At").tooltip("Location").into(),
        ColumnDef::category("Opp").header("Opp").tooltip("Opponent").link().into(),
        stat("Tm Sc", "Team Score").into(),
        stat("Opp Sc", "Opponent Score").into(),
        ColumnDef::category("Result").highlight_containing("W", "#D0F8AB").into(),
        stat("G", "Goals").into(),
        stat("A", "Assists").into(),
        stat("PTS", "Points").into(),
        stat("SOG", "Shots on Goal").into(),
        stat("+/-", "Plus/Minus").into(),
        stat("PPG", "Points per Game").into(),
        stat("SHG", "Shorthanded Goals").into(),
        stat("PIM", "Penalty Minutes").into(),
        ColumnDef::text("TOI").header("TOI").tooltip("Time on Ice").text_filter().into(),
        stat("HT", "Hits").into(),
        stat("BK", "Blocks").into(),
        stat("TK", "Takes").into(),
        ColumnGroup::new(
            "Shootout",
            vec![
                stat("SO G", "Shootout Goals").header("G"),
                stat("SO ATT", "Shootout Attempts").header("ATT"),
            ],
        )
        .into(),
    ];

    PageSpec::new(
        "nhl/player/mitch/gamelog",
        "Mitch Marner Game Log",
        vec![GridSpec::new(
            DEFAULT_MOUNT_ID,
            &["/data/Mitch_GameLog_2024_v2.json"],
            options,
            columns,
        )],
    )
}

pub fn mitch_goal_log() -> PageSpec {
    let options = GridOptions::grouped_log(RowGroupPanelShow::Never, 2);

    let columns = vec![
        ColumnDef::grouping("Season").header("Season").tooltip("Season").into(),
        ColumnDef::grouping("Type").header("Gm Type").tooltip("Game Type").into(),
        ColumnDef::text("Date").header("Date").tooltip("Date").into(),
        stat("Period", "Period").into(),
        ColumnDef::text("Time").header("Time").tooltip("Time").into(),
        ColumnDef::category("Team").header("Team").tooltip("Team").link().into(),
        ColumnDef::category("Opp").header("Opp").tooltip("Opponent").link().into(),
        ColumnDef::text("Details").header("Details").tooltip("Details").text_filter().into(),
        stat("Tm Sc", "Team Score").into(),
        stat("Opp Sc", "Opponent Score").into(),
    ];

    PageSpec::new(
        "nhl/player/mitch/goallog",
        "Mitch Marner Goal Log",
        vec![GridSpec::new(
            DEFAULT_MOUNT_ID,
            &["/data/Mitch_GoalLog_v1.json"],
            options,
            columns,
        )],
    )
}

pub fn mitch_splits() -> PageSpec {
    let mut options = GridOptions::grouped_log(RowGroupPanelShow::Never, 1);
    options.auto_size_strategy = Some(AutoSizeStrategy::FitGridWidth);
    options.default_col_def.floating_filter = Some(false);
    options.group_row_renderer_params = Some(GroupRowRendererParams {
        suppress_count: true,
    });

    let columns = vec![
        ColumnDef::grouping("Season").header("Season").tooltip("Season").into(),
        ColumnDef::text("Split")
            .tooltip("Split")
            .text_filter()
            .pinned(Pinned::Left)
            .width(300)
            .into(),
        stat("GP", "Games Played").into(),
        ColumnDef::text("TOI").tooltip("Time On Ice").text_filter().into(),
        stat("G", "Goals").into(),
        stat("A", "Assists").into(),
        stat("PTS", "Points").into(),
        stat("PPG", "Points per Game").into(),
        stat("SOG", "Shots on Goal").into(),
        stat("+/-", "Plus/Minus").into(),
        stat("PIM", "Penalty Minutes").into(),
        ColumnGroup::new(
            "Power Play",
            vec![
                stat("PP G", "Power Play Goals").header("G"),
                stat("PP PTS", "Power Play Points").header("PTS"),
            ],
        )
        .into(),
        ColumnGroup::new(
            "Shorthanded",
            vec![
                stat("SH G", "Shorthanded Goals").header("G"),
                stat("SH PTS", "Shorthanded Points").header("PTS"),
            ],
        )
        .into(),
    ];

    PageSpec::new(
        "nhl/player/mitch/splits",
        "Mitch Marner Splits",
        vec![GridSpec::new(
            DEFAULT_MOUNT_ID,
            &[
                "/data/Mitch_Splits_Career_v1.json",
                "/data/Mitch_Splits_2024_v2.json",
                "/data/Mitch_Splits_2023_v2.json",
            ],
            options,
            columns,
        )],
    )
}
