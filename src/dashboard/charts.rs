//! The bar chart of spending per category.
//!
//! The chart is rendered as an ECharts configuration plus an inline script
//! that (re)initialises the chart. The script runs whenever the summary is
//! swapped in, so live updates redraw the chart.

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::bar,
};
use maud::{Markup, PreEscaped, html};

use crate::summary::CategoryTotal;

/// The ID of the element the category chart is drawn in.
pub(super) const CATEGORY_CHART_ID: &str = "category-chart";

pub(super) fn category_chart(totals: &[CategoryTotal]) -> Chart {
    let labels = totals
        .iter()
        .map(|total| total.category.label())
        .collect::<Vec<_>>();
    let values = totals.iter().map(|total| total.total).collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Spending by category"))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(bar::Bar::new().name("Total").data(values))
}

/// The chart container and the script that draws `totals` into it.
pub(super) fn category_chart_view(totals: &[CategoryTotal]) -> Markup {
    if totals.is_empty() {
        return html! {};
    }

    let script = format!(
        r#"(function() {{
            const chartDom = document.getElementById("{id}");
            if (!chartDom || typeof echarts === "undefined") return;

            const previous = echarts.getInstanceByDom(chartDom);
            if (previous) previous.dispose();

            const chart = echarts.init(chartDom);
            chart.setOption({options});

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');

            if (!window.categoryChartResizeListener) {{
                window.categoryChartResizeListener = () => {{
                    const current = echarts.getInstanceByDom(document.getElementById("{id}"));
                    if (current) current.resize();
                }};
                window.addEventListener('resize', window.categoryChartResizeListener);
            }}
        }})();"#,
        id = CATEGORY_CHART_ID,
        options = category_chart(totals),
    );

    html! {
        section class="w-full"
        {
            div
                id=(CATEGORY_CHART_ID)
                class="min-h-[320px] rounded dark:bg-gray-100"
            {}

            script { (PreEscaped(script)) }
        }
    }
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-IN', {
              style: 'currency',
              currency: 'INR',
              maximumFractionDigits: 0
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::{expense::Category, summary::CategoryTotal};

    use super::{CATEGORY_CHART_ID, category_chart, category_chart_view};

    fn totals() -> Vec<CategoryTotal> {
        vec![
            CategoryTotal {
                category: Category::Accommodation,
                total: 24_000.0,
            },
            CategoryTotal {
                category: Category::Food,
                total: 3_500.0,
            },
        ]
    }

    #[test]
    fn chart_lists_categories_in_order() {
        let options = category_chart(&totals()).to_string();

        let accommodation = options.find("Accommodation").unwrap();
        let food = options.find("Food").unwrap();
        assert!(accommodation < food, "want categories in descending order: {options}");
        assert!(options.contains("24000"), "want totals in chart: {options}");
    }

    #[test]
    fn view_has_container_and_init_script() {
        let html = Html::parse_fragment(&category_chart_view(&totals()).into_string());

        let container = html
            .select(&Selector::parse(&format!("#{CATEGORY_CHART_ID}")).unwrap())
            .next();
        assert!(container.is_some());

        let script = html
            .select(&Selector::parse("script").unwrap())
            .next()
            .expect("want an init script")
            .inner_html();
        assert!(script.contains("echarts.init"));
    }

    #[test]
    fn no_chart_without_totals() {
        assert_eq!(category_chart_view(&[]).into_string(), "");
    }
}
