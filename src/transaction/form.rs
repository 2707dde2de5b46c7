use maud::{Markup, html};
use rust_decimal::Decimal;
use time::Date;

use crate::{
    goal::Goal,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, select_input,
    },
    transaction::TransactionType,
};

/// The values the transaction form starts with.
pub struct TransactionFormDefaults<'a> {
    pub transaction_type: TransactionType,
    pub amount: Option<Decimal>,
    pub category: Option<&'a str>,
    pub date: Date,
    pub description: Option<&'a str>,
    pub autofocus_amount: bool,
}

/// The inputs shared by the new and edit transaction forms.
///
/// The goal selector is only rendered when `goals` is not empty, since a
/// goal can only be linked when a transaction is first recorded.
pub fn transaction_form_fields(
    defaults: &TransactionFormDefaults<'_>,
    categories: &[String],
    goals: &[Goal],
) -> Markup {
    let is_expense = matches!(defaults.transaction_type, TransactionType::Expense);
    let amount_str = defaults.amount.map(|amount| amount.round_dp(2).to_string());

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Transaction type" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                div class="flex items-center gap-3"
                {
                    input
                        name="type"
                        id="transaction-type-expense"
                        type="radio"
                        value="expense"
                        checked[is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-expense"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Expense"
                    }
                }

                div class="flex items-center gap-3"
                {
                    input
                        name="type"
                        id="transaction-type-income"
                        type="radio"
                        value="income"
                        checked[!is_expense]
                        required
                        tabindex="0"
                        class=(FORM_RADIO_INPUT_STYLE);

                    label
                        for="transaction-type-income"
                        class=(FORM_RADIO_LABEL_STYLE)
                    {
                        "Income"
                    }
                }
            }
        }

        div
        {
            label
                for="amount"
                class=(FORM_LABEL_STYLE)
            {
                "Amount"
            }

            div class="input-wrapper w-full"
            {
                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    placeholder="0.01"
                    min="0.01"
                    required
                    value=[amount_str.as_deref()]
                    autofocus[defaults.autofocus_amount]
                    class=(FORM_TEXT_INPUT_STYLE);
            }
        }

        (select_input("Category", "category", categories, defaults.category, None))

        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Date"
            }

            input
                name="date"
                id="date"
                type="date"
                value=(defaults.date.to_string())
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Description"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Description"
                value=[defaults.description]
                class=(FORM_TEXT_INPUT_STYLE);
        }

        @if !goals.is_empty() {
            div
            {
                label
                    for="goal_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Goal"
                }

                select
                    name="goal_id"
                    id="goal_id"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected { "No goal" }

                    @for goal in goals {
                        option value=(goal.id) { (goal.name) }
                    }
                }
            }
        }
    }
}
