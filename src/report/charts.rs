//! ECharts configuration for the reports page.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::bar,
};
use maud::{Markup, PreEscaped, html};

use crate::{
    html::HeadElement,
    report::data::{CategoryExpenses, MonthlyData, ReportAmount},
};

/// A chart with its HTML container ID and ECharts configuration.
pub(super) struct ReportChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders a grid of empty containers, one per chart.
pub(super) fn charts_view(charts: &[ReportChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates the script that initialises each chart once the page has loaded.
///
/// Charts follow the browser's dark mode preference and resize with the window.
pub(super) fn charts_script(charts: &[ReportChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

pub(super) fn category_expenses_chart(expenses: &CategoryExpenses) -> Chart {
    Chart::new()
        .title(Title::new().text("Expenses by category"))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(expenses.categories.clone()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .data(to_values(&expenses.data)),
        )
}

pub(super) fn monthly_flow_chart(monthly: &MonthlyData) -> Chart {
    Chart::new()
        .title(Title::new().text("Monthly income and expenses"))
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(60)
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(monthly.months.clone()),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Income")
                .data(to_values(&monthly.income)),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .data(to_values(&monthly.expense)),
        )
}

fn to_values(amounts: &[ReportAmount]) -> Vec<f64> {
    amounts.iter().map(ReportAmount::as_f64).collect()
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod charts_tests {
    use maud::PreEscaped;
    use rust_decimal_macros::dec;

    use crate::{
        html::HeadElement,
        report::data::{CategoryExpenses, ReportAmount},
    };

    use super::{ReportChart, category_expenses_chart, charts_script};

    #[test]
    fn category_chart_lists_categories() {
        let expenses = CategoryExpenses {
            categories: vec!["food".to_owned(), "transport".to_owned()],
            data: vec![ReportAmount(dec!(80)), ReportAmount(dec!(12.5))],
        };

        let options = category_expenses_chart(&expenses).to_string();

        assert!(options.contains("\"food\""));
        assert!(options.contains("\"transport\""));
        assert!(options.contains("12.5"));
    }

    #[test]
    fn script_initialises_every_chart() {
        let charts = [
            ReportChart {
                id: "first-chart",
                options: "{}".to_owned(),
            },
            ReportChart {
                id: "second-chart",
                options: "{}".to_owned(),
            },
        ];

        let HeadElement::ScriptSource(PreEscaped(script)) = charts_script(&charts) else {
            panic!("expected inline script");
        };

        assert!(script.starts_with("document.addEventListener('DOMContentLoaded'"));
        assert!(script.contains("document.getElementById(\"first-chart\")"));
        assert!(script.contains("document.getElementById(\"second-chart\")"));
    }
}
