use std::fmt::Write;

use anyhow::Result;
use pulldown_cmark::{html, Parser};
use serde_json::json;

use crate::{
    callbacks::{Component, Selection},
    figure::{Figure, StaticFigures, TEXT},
    options::{sex_options, DropdownOption},
    stats::Distributions,
};

pub const UPDATE_ROUTE: &str = "/_dashboard/update";

const THEME_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootswatch@5.3.3/dist/sketchy/bootstrap.min.css";
const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const LINK_COLOR: &str = "#0084d6";

const INTRO: &str = "Ever heard someone claim their horoscope sign makes them a natural-born \
fighter? Well, the famous trainer Cus D'Amato said that. While intriguing, this sparked a \
different question: does data reveal any truth behind these claims? We set out to explore the \
characteristics of champions, using data analysis to see if there's a science behind boxing \
success, beyond the stars. This dashboard is dedicated to analyzing the characteristics of \
boxing champions. Explore the data to uncover insights into the physical attributes, \
backgrounds and distinguishing features of boxing's elite. Check the discussion and results in";

const DISCUSSION: &str = r#"##### • Project Context

I have been a passionate follower of boxing for the past five or six years, even undergoing
training at one point. One question that has always intrigued me is whether height and reach
provide a competitive advantage in the sport. While most people would agree that they do, there
have been outliers such as Mike Tyson, who was able to consistently defeat opponents much taller
than him despite his shorter stature. During a podcast featuring Teddy Atlas, Tyson's former
coach, he mentioned a theory from Cus D'Amato that certain astrological signs, including
Aquarius, Capricorn, Taurus and Cancer, "make good boxers". Being a firm non-believer in
astrology, I decided to delve into an analysis of boxing champions to answer these questions:

1. Which countries emerge as the primary producers of titleholders?
2. How does the height and reach of boxing champions compare to individuals of similar weight in
   the general population?
3. Is there a discernible trend indicating that individuals born under certain zodiac signs,
   such as Aquarius, Capricorn, Taurus and Cancer, tend to excel in the sport?

##### • Data Collection

I didn't find a good dataset for this project, so I scraped the web for data on boxing
champions. First, I collected the names of the titleholders for the 4 major organizations (WBA,
WBC, WBO and IBF), the Ring Magazine and the IBO. I also collected some data on Olympic boxers
(though limited due to the unpopularity of Olympic boxing). Then I scraped the needed data from
their Wikipedia pages.

##### • Data Cleaning

The data was really messy, so I had to do some cleaning. I extracted the country from the birth
address, normalized height and reach to metric units, removed duplicates, and added columns
like sex and astrological sign.

##### • Analysis and Results

• First, let's see the nationality distribution of the titleholders.
"#;

const NATIONALITY_NOTE: &str =
    "- USA, Mexico and UK are expected. I was surprised, though, by seeing Japan and not seeing Russia.";

const SIZE_NOTE: &str = "- It's evident that champion boxers, regardless of sex and weight \
class, tend to hover around an average height of approximately 170 cm, slightly surpassing the \
global average of 168 cm. At first glance, this might suggest that height isn't a significant \
factor in boxing success. However, the average reach among champion boxers sits closer to \
180 cm. This discrepancy between height and reach indicates that while height alone may not be \
a defining factor, reach plays a pivotal role. This gains significance when considering that \
people typically maintain a proportional 1:1 relationship between height and reach. Hence, \
reach emerges as a crucial factor influencing competitive advantage.";

const ZODIAC_NOTE: &str =
    "- It's evident that there is no relationship between zodiac signs and the ability to excel in boxing. Sorry Cus!";

// Client side of the event registry: post the selection, apply the returned outputs.
const CONTROLLER_JS: &str = r#"
const state = Object.assign({}, SELECTION);
for (const [id, figure] of Object.entries(FIGURES)) {
  Plotly.newPlot(id, figure.data, figure.layout, { responsive: true });
}
function applyOutput(output) {
  const element = document.getElementById(output.target);
  if (output.property === "figure") {
    Plotly.react(output.target, output.value.data, output.value.layout);
  } else if (output.property === "options") {
    element.replaceChildren(new Option("Select weight class", "", true, true));
    element.options[0].disabled = true;
    for (const option of output.value) {
      element.add(new Option(option.label, option.value));
    }
  } else if (output.property === "value") {
    element.value = output.value === null ? "" : output.value;
  }
}
let latestRequest = 0;
async function dispatch(source) {
  const request = ++latestRequest;
  const response = await fetch(UPDATE_ROUTE, {
    method: "POST",
    headers: { "content-type": "application/json" },
    body: JSON.stringify({ source: source, event: "change", state: state }),
  });
  if (request !== latestRequest) {
    return;
  }
  if (!response.ok) {
    console.error(await response.text());
    return;
  }
  const update = await response.json();
  // A newer request may have been sent while the body was read.
  if (request !== latestRequest) {
    return;
  }
  Object.assign(state, update.selection);
  update.outputs.forEach(applyOutput);
}
document.getElementById("sex-dropdown").addEventListener("change", (event) => {
  state.sex = event.target.value;
  dispatch("sex-dropdown");
});
document.getElementById("weight-dropdown").addEventListener("change", (event) => {
  state.weight = event.target.value || null;
  dispatch("weight-dropdown");
});
"#;

/// What the page shows on first load.
#[derive(Debug)]
pub struct PageContent<'a> {
    pub figures: &'a StaticFigures,
    pub distributions: &'a Distributions,
    pub selection: &'a Selection,
    pub weight_options: &'a [DropdownOption],
    pub height: &'a Figure,
    pub reach: &'a Figure,
}

fn markdown(text: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(text));
    out
}

fn graph(id: &str, class: &str) -> String {
    format!(r#"<div id="{}" class="{}"></div>"#, id, class)
}

fn select(
    id: &str,
    placeholder: Option<&str>,
    options: &[DropdownOption],
    selected: Option<&str>,
) -> String {
    let mut out = format!(
        r#"<select id="{}" class="form-select card mb-2" style="background-color: #ffffff; color: {}">"#,
        id, TEXT
    );
    if let Some(placeholder) = placeholder {
        let chosen = if selected.is_none() { " selected" } else { "" };
        out += &format!(r#"<option value="" disabled{}>{}</option>"#, chosen, placeholder);
    }
    for option in options {
        let chosen = if selected == Some(option.value.as_str()) {
            " selected"
        } else {
            ""
        };
        out += &format!(
            r#"<option value="{}"{}>{}</option>"#,
            option.value, chosen, option.label
        );
    }
    out + "</select>"
}

/// Sentence with the observed means, shown under the authored size commentary.
pub fn size_summary(distributions: &Distributions) -> Option<String> {
    let height = distributions.height.as_ref()?;
    let reach = distributions.reach.as_ref()?;
    Some(format!(
        "- Measured over {} heights and {} reaches in this dataset: mean height {:.1} cm \
         (σ {:.1}, range {:.0} to {:.0}), mean reach {:.1} cm (σ {:.1}, range {:.0} to {:.0}).",
        distributions.heights.len(),
        distributions.reaches.len(),
        height.mean,
        height.std_dev,
        height.min,
        height.max,
        reach.mean,
        reach.std_dev,
        reach.min,
        reach.max,
    ))
}

// Keeps `</script>` inside JSON strings from closing the script element.
fn script_json(value: &serde_json::Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text.replace("</", "<\\/"))
}

pub fn render(content: &PageContent, pretty: bool) -> Result<String> {
    let figures = content.figures;
    let figure_map = json!({
        "choropleth": figures.choropleth,
        "height-graph": content.height,
        "reach-graph": content.reach,
        "zodiac_freq": figures.zodiac,
        "ko-by-group": figures.ko_by_group,
        "nationalities": figures.nationalities,
        "height-all": figures.height,
        "reach-all": figures.reach,
        "zodiac-discussion": figures.zodiac,
    });

    let mut page = String::new();
    write!(
        page,
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Boxing Analytics</title>
<link rel="stylesheet" href="{theme}">
<script src="{plotly}"></script>
</head>
<body>
<div class="container-fluid">
<h1 style="text-align: center; margin-bottom: 20px">Boxing Analytics</h1>
<div class="col-md-12 col-lg-12 mb-md-2 mb-4 card-chart-container">
<div class="card">
<div class="row">
<div class="col-lg-9">
<br>
<span style="color: {link}; font-size: 1.5vw">Boxing By the Stars: Fact or Fiction?</span>
<br>
<div class="card-text">
<p>{intro} <a href="#discussion" style="color: {link}">Discussion.</a></p>
<p class="mt-1">*Note: dashboard only covers data up to the beginning of 2024.</p>
</div>
</div>
<div class="col-lg-3" style="align-self: self-end"></div>
</div>
</div>
</div>
<h3 style="text-align: left; padding-top: 20px">I.&nbsp;&nbsp;&nbsp;&nbsp; Dashboard</h3>
<div class="row">
<div class="col-lg-6">{choropleth}</div>
<div class="col-lg-6">
<div style="margin-bottom: 20px">
{sex_select}
{weight_select}
</div>
<div style="justify-content: space-between; margin-bottom: 30px">
{height_graph}
{reach_graph}
</div>
</div>
</div>
<div class="row">
<div class="col">{zodiac}</div>
<div class="col">{ko}</div>
</div>
<h3 id="discussion" style="text-align: left; padding-top: 20px">II.&nbsp;&nbsp;&nbsp;&nbsp; Discussion</h3>
<div style="margin-bottom: 30px">{discussion}</div>
{nationalities}
{nationality_note}
{size_heading}
<div class="row">
<div class="col-lg-6">{height_all}</div>
<div class="col-lg-6">{reach_all}</div>
</div>
{size_note}
{zodiac_heading}
{zodiac_discussion}
{zodiac_note}
</div>
<script>
const UPDATE_ROUTE = "{route}";
const SELECTION = {selection};
const FIGURES = {figures};
{controller}
</script>
</body>
</html>
"##,
        theme = THEME_CSS,
        plotly = PLOTLY_JS,
        link = LINK_COLOR,
        intro = INTRO,
        choropleth = graph("choropleth", "card"),
        sex_select = select(
            Component::SexDropdown.id(),
            None,
            &sex_options(),
            Some(content.selection.sex.as_str()),
        ),
        weight_select = select(
            Component::WeightDropdown.id(),
            Some("Select weight class"),
            content.weight_options,
            content.selection.weight.as_deref(),
        ),
        height_graph = graph(Component::HeightGraph.id(), "card mt-4"),
        reach_graph = graph(Component::ReachGraph.id(), "card mt-4"),
        zodiac = graph("zodiac_freq", "card"),
        ko = graph("ko-by-group", "card"),
        discussion = markdown(DISCUSSION),
        nationalities = graph("nationalities", ""),
        nationality_note = markdown(NATIONALITY_NOTE),
        size_heading = markdown("• Height & Reach"),
        height_all = graph("height-all", ""),
        reach_all = graph("reach-all", ""),
        size_note = markdown(&match size_summary(content.distributions) {
            Some(summary) => format!("{}\n{}", SIZE_NOTE, summary),
            None => SIZE_NOTE.to_string(),
        }),
        zodiac_heading = markdown("• Zodiac Signs"),
        zodiac_discussion = graph("zodiac-discussion", ""),
        zodiac_note = markdown(ZODIAC_NOTE),
        route = UPDATE_ROUTE,
        selection = script_json(&json!(content.selection), pretty)?,
        figures = script_json(&figure_map, pretty)?,
        controller = CONTROLLER_JS,
    )?;
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        callbacks::size_histograms,
        dataset::{fixtures::sample_records, BoxerRecord},
        options::weight_options,
        stats::Views,
    };

    fn render_sample(pretty: bool) -> String {
        let records = sample_records();
        let views = Views::compute(&records);
        let figures = StaticFigures::build(&views);
        let selection = Selection::default();
        let (height, reach) = size_histograms(&records, &selection.sex, None);
        render(
            &PageContent {
                figures: &figures,
                distributions: &views.distributions,
                selection: &selection,
                weight_options: &weight_options(&selection.sex),
                height: &height,
                reach: &reach,
            },
            pretty,
        )
        .unwrap()
    }

    #[test]
    fn page_has_controls_and_every_graph() {
        let page = render_sample(false);
        for id in [
            "choropleth",
            "sex-dropdown",
            "weight-dropdown",
            "height-graph",
            "reach-graph",
            "zodiac_freq",
            "ko-by-group",
            "nationalities",
            "height-all",
            "reach-all",
            "zodiac-discussion",
        ] {
            assert!(page.contains(&format!("id=\"{}\"", id)), "missing {}", id);
        }
        assert!(page.contains(r#"<option value="M" selected>Male</option>"#));
        assert!(page.contains(
            r#"<option value="" disabled selected>Select weight class</option>"#
        ));
        assert!(page.contains(r#"<option value="cruiserweight">cruiserweight</option>"#));
        assert!(page.contains(UPDATE_ROUTE));
    }

    #[test]
    fn discussion_markdown_is_rendered() {
        let page = render_sample(false);
        assert!(page.contains("<h5>• Project Context</h5>"));
        assert!(page.contains("<ol>"));
        assert!(page.contains("Sorry Cus!"));
        assert!(page.contains("mean height"));
    }

    #[test]
    fn figures_are_embedded_as_json() {
        let page = render_sample(false);
        assert!(page.contains(r#""locationmode":"country names""#));
        assert!(page.contains(r#"const SELECTION = {"sex":"M","weight":null};"#));
        assert!(render_sample(true).contains("\n  \"choropleth\": {"));
    }

    #[test]
    fn controller_drops_superseded_responses() {
        let page = render_sample(false);
        assert!(page.contains("const request = ++latestRequest;"));
        assert_eq!(page.matches("if (request !== latestRequest) {").count(), 2);
        let guard = page.find("if (request !== latestRequest)").unwrap();
        let apply = page.find("Object.assign(state, update.selection)").unwrap();
        assert!(guard < apply);
    }

    #[test]
    fn script_json_escapes_closing_tags() {
        let text = script_json(&json!({ "title": "</script><b>" }), false).unwrap();
        assert_eq!(text, r#"{"title":"<\/script><b>"}"#);
    }

    #[test]
    fn size_summary_needs_both_measurements() {
        let views = Views::compute(&sample_records());
        let summary = size_summary(&views.distributions).unwrap();
        assert!(summary.contains("14 heights and 11 reaches"));
        assert_eq!(size_summary(&Distributions::of(&Vec::<BoxerRecord>::new())), None);
    }
}
