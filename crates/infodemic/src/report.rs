use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use minijinja::{context, Environment};
use serde::Serialize;

use crate::chart::{compact, Line, LineChart};
use crate::config::Config;
use crate::month::{self, MonthlyRow};
use crate::pipeline::Tables;
use crate::prelude::*;
use crate::rescale;
use crate::wordcloud::{self, Layout};

const TEMPLATE: &str = include_str!("../templates/report.html");
const TOP_TERMS: usize = 20;

/// The busiest month and the total of a source.
#[derive(Debug, Serialize)]
struct Highlight {
    label: &'static str,
    peak_month: String,
    peak_value: String,
    total: String,
}

pub(crate) struct Rendered {
    pub(crate) html: String,
    pub(crate) wordcloud: String,
}

/// Formats `2021-03-01` as `March 2021`.
fn month_label(month: &str) -> String {
    NaiveDate::parse_from_str(month, "%Y-%m-%d")
        .map(|date| date.format("%B %Y").to_string())
        .unwrap_or_else(|_| month.to_string())
}

/// Turns rows sorted by group into one line per group.
fn lines<I>(rows: I) -> Vec<Line>
where
    I: IntoIterator<Item = (String, String, f64)>,
{
    let mut lines: Vec<Line> = vec![];

    for (label, month, value) in rows {
        if let Some(line) =
            lines.last_mut().filter(|line| line.label == label)
        {
            line.points.push((month, value));
        } else {
            lines.push(Line::new(label, vec![(month, value)]));
        }
    }

    lines
}

fn monthly_lines(rows: Vec<MonthlyRow>) -> Vec<Line> {
    lines(rows.into_iter().map(|row| (row.group, row.month, row.value)))
}

fn highlights(tables: &Tables) -> InfodemicResult<Vec<Highlight>> {
    let sources = [
        ("Confirmed cases", &tables.cases_global),
        ("Search interest", &tables.trends),
        ("Page views", &tables.pageviews),
        ("Preprints", &tables.preprints),
    ];

    let mut highlights = vec![];
    for (label, df) in sources {
        let Some(peak) = month::peak(df)? else {
            continue;
        };

        highlights.push(Highlight {
            label,
            peak_month: month_label(&peak.month),
            peak_value: compact(peak.value),
            total: compact(month::total(df)?),
        });
    }

    Ok(highlights)
}

/// Renders the report document and the word cloud image.
pub(crate) fn render(
    config: &Config,
    tables: &Tables,
) -> InfodemicResult<Rendered> {
    let combined = lines(
        rescale::rows(&tables.combined)?
            .into_iter()
            .map(|row| (row.source, row.month, row.scaled)),
    );

    let combined_chart =
        LineChart::new("Attention in comparison", "rescaled", combined)
            .to_svg();
    let continent_chart = LineChart::new(
        "Confirmed cases by continent",
        "cases",
        monthly_lines(month::rows(&tables.cases_continent)?),
    )
    .to_svg();
    let preprint_chart = LineChart::new(
        "New preprints",
        "preprints",
        monthly_lines(month::rows(&tables.preprints)?),
    )
    .to_svg();

    let terms = wordcloud::terms(&tables.tokens, &config.words);
    let layout = Layout {
        max_words: config.words.max_words,
        ..Default::default()
    };
    let placed = layout.place(&terms);
    let wordcloud = layout.to_svg(&placed);

    let top_terms: Vec<_> = terms.iter().take(TOP_TERMS).collect();
    let metadata = &config.metadata;

    let mut env = Environment::new();
    env.add_template("report.html", TEMPLATE)?;
    let html = env.get_template("report.html")?.render(context! {
        generator => concat!(
            env!("CARGO_PKG_NAME"),
            " ",
            env!("CARGO_PKG_VERSION")
        ),
        name => &metadata.name,
        version => metadata.version.to_string(),
        title => &metadata.title,
        description => &metadata.description,
        authors => &metadata.authors,
        period => &config.period,
        highlights => highlights(tables)?,
        combined_chart => combined_chart,
        continent_chart => continent_chart,
        preprint_chart => preprint_chart,
        preprint_total => format!("{:.0}", month::total(&tables.preprints)?),
        wordcloud => &wordcloud,
        cloud_size => placed.len(),
        top_terms => top_terms,
    })?;

    Ok(Rendered { html, wordcloud })
}

/// Writes the report and, next to it, the word cloud image. Returns
/// the path of the report.
pub(crate) fn write(
    rendered: &Rendered,
    path: &Path,
) -> InfodemicResult<PathBuf> {
    let dir = path.parent().unwrap_or(Path::new(""));
    fs::create_dir_all(dir)?;

    fs::write(path, &rendered.html)?;
    fs::write(dir.join(Project::WORDCLOUD), &rendered.wordcloud)?;

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::month::Observation;

    type TestResult = anyhow::Result<()>;

    fn obs(m: u32, group: &str, value: f64) -> Observation {
        Observation::new(
            NaiveDate::from_ymd_opt(2021, m, 10).unwrap(),
            group,
            value,
        )
    }

    fn tables() -> anyhow::Result<Tables> {
        let cases_global = month::aggregate(&[
            obs(1, "World", 100.0),
            obs(2, "World", 400.0),
            obs(3, "World", 250.0),
        ])?;
        let cases_continent = month::aggregate(&[
            obs(1, "Europe", 60.0),
            obs(2, "Europe", 90.0),
            obs(1, "Asia", 40.0),
            obs(2, "Asia", 10.0),
        ])?;
        let trends = month::aggregate(&[
            obs(1, "trends", 100.0),
            obs(2, "trends", 40.0),
            obs(3, "trends", 20.0),
        ])?;
        let pageviews = month::aggregate(&[
            obs(1, "pageviews", 5e6),
            obs(2, "pageviews", 3e6),
            obs(3, "pageviews", 1e6),
        ])?;
        let preprints = month::aggregate(&[
            obs(1, "preprints", 1.0),
            obs(3, "preprints", 1.0),
        ])?;

        let combined = rescale::combine(&[
            ("cases", &cases_global),
            ("trends", &trends),
            ("pageviews", &pageviews),
        ])?;

        let tokens = vec!["vaccine mask vaccine school <b>mask</b> vaccine"
            .split_whitespace()
            .map(String::from)
            .collect()];

        Ok(Tables {
            cases_global,
            cases_continent,
            trends,
            pageviews,
            preprints,
            combined,
            tokens,
        })
    }

    #[test]
    fn month_labels() {
        assert_eq!(month_label("2021-03-01"), "March 2021");
        assert_eq!(month_label("garbage"), "garbage");
    }

    #[test]
    fn lines_split_by_label() {
        let lines = lines(vec![
            ("a".to_string(), "2021-01-01".to_string(), 1.0),
            ("a".to_string(), "2021-02-01".to_string(), 2.0),
            ("b".to_string(), "2021-01-01".to_string(), 3.0),
        ]);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].points.len(), 2);
        assert_eq!(lines[1].label, "b");
    }

    #[test]
    fn render_report() -> TestResult {
        let mut config = Config::default();
        config.metadata.name = "covid".into();
        config.metadata.title = "Cases & clicks".into();
        config.metadata.authors = vec!["Jane Doe".into()];

        let rendered = render(&config, &tables()?)?;
        let html = &rendered.html;

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Cases &amp; clicks</title>"));
        assert!(html.contains("By Jane Doe"));
        assert_eq!(html.matches("<svg").count(), 4);
        assert!(html.contains("February 2021"));
        assert!(html.contains("5.0M"));
        assert!(html.contains("<td>vaccine</td><td class=\"num\">3</td>"));
        assert!(!html.contains("<b>mask</b>"));

        assert!(rendered.wordcloud.starts_with("<svg"));
        assert!(rendered.wordcloud.contains(">vaccine</text>"));
        Ok(())
    }

    #[test]
    fn write_report_and_wordcloud() -> TestResult {
        let dir = tempfile::tempdir()?;
        let rendered = Rendered {
            html: "<html></html>".into(),
            wordcloud: "<svg></svg>".into(),
        };

        let path = dir.path().join("out").join(Project::REPORT);
        assert_eq!(write(&rendered, &path)?, path);
        assert_eq!(fs::read_to_string(&path)?, "<html></html>");
        assert_eq!(
            fs::read_to_string(dir.path().join("out/wordcloud.svg"))?,
            "<svg></svg>"
        );
        Ok(())
    }
}
