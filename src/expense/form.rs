use maud::{Markup, html};
use time::Date;

use crate::{
    endpoints,
    expense::{Category, FieldError, RawExpenseInput, field_error},
    html::{FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// What to show in the expense form fields.
pub struct ExpenseFormValues<'a> {
    /// The previous submission, or the default input for a blank form.
    pub input: &'a RawExpenseInput,
    /// Errors from the previous submission.
    pub errors: &'a [FieldError],
    /// Admins get an extra field to choose who the expense belongs to.
    pub is_admin: bool,
    /// Today's date in the server's timezone.
    pub max_date: Date,
}

fn error_message(errors: &[FieldError], field: &str) -> Markup {
    html! {
        @if let Some(message) = field_error(errors, field) {
            p id=(format!("{field}-error")) class=(FORM_ERROR_STYLE) { (message) }
        }
    }
}

fn text_field(
    name: &str,
    label: &str,
    value: &str,
    required: bool,
    errors: &[FieldError],
) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                name=(name)
                id=(name)
                type="text"
                value=(value)
                required[required]
                class=(FORM_TEXT_INPUT_STYLE);

            (error_message(errors, name))
        }
    }
}

fn amount_field(name: &str, label: &str, value: &str, errors: &[FieldError]) -> Markup {
    let annotation_id = format!("{name}-annotation");
    let annotation_url = format!("{}?field={name}", endpoints::EXPENSE_ANNOTATION_API);

    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            // w-full needed to ensure input takes the full width when prefilled with a value
            div class="input-wrapper w-full"
            {
                input
                    name=(name)
                    id=(name)
                    type="number"
                    step="0.01"
                    min="0"
                    placeholder="0.00"
                    value=(value)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
                id=(annotation_id)
                class="mt-1 text-sm text-gray-500 dark:text-gray-400"
                hx-post=(annotation_url)
                hx-include="closest form"
                hx-trigger=(format!("load, input changed delay:300ms from:#{name}"))
                hx-swap="innerHTML"
            {}

            (error_message(errors, name))
        }
    }
}

/// The inputs of the expense form.
///
/// The create endpoint swaps these into `#expense-form` when validation fails.
pub fn expense_form_fields(values: &ExpenseFormValues<'_>) -> Markup {
    let input = values.input;
    let errors = values.errors;
    let date = input
        .date
        .clone()
        .filter(|date| !date.trim().is_empty())
        .unwrap_or_else(|| values.max_date.to_string());

    html! {
        (text_field("description", "Description", &input.description, true, errors))
        (text_field("paid_to", "Paid to", &input.paid_to, true, errors))
        (text_field(
            "contact_info",
            "Contact info (optional)",
            input.contact_info.as_deref().unwrap_or_default(),
            false,
            errors,
        ))

        div
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            select name="category" id="category" required class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "Select a category" }

                @for category in Category::ALL {
                    option
                        value=(category.as_str())
                        selected[input.category == category.as_str()]
                    {
                        (category.label())
                    }
                }
            }

            (error_message(errors, "category"))
        }

        (amount_field("total_amount", "Total amount (INR)", &input.total_amount, errors))
        (amount_field("advance_paid", "Advance paid (INR)", &input.advance_paid, errors))

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                name="date"
                id="date"
                type="date"
                max=(values.max_date)
                value=(date)
                required
                class=(FORM_TEXT_INPUT_STYLE);

            (error_message(errors, "date"))
        }

        @if values.is_admin {
            (text_field(
                "user_name",
                "Expense belongs to",
                input.user_name.as_deref().unwrap_or_default(),
                true,
                errors,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::Html;
    use time::macros::date;

    use crate::{
        expense::{FieldError, RawExpenseInput},
        test_utils::{
            assert_field_error, assert_form_input, assert_form_input_with_value,
            assert_no_field_error, get_select_options, must_get_form,
        },
    };

    use super::{ExpenseFormValues, expense_form_fields};

    fn render(input: &RawExpenseInput, errors: &[FieldError], is_admin: bool) -> Html {
        let fields = expense_form_fields(&ExpenseFormValues {
            input,
            errors,
            is_admin,
            max_date: date!(2025 - 03 - 10),
        });

        Html::parse_fragment(&format!("<form>{}</form>", fields.into_string()))
    }

    #[test]
    fn blank_form_defaults_date_to_today() {
        let html = render(&RawExpenseInput::default(), &[], false);
        let form = must_get_form(&html);

        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "paid_to", "text");
        assert_form_input(&form, "total_amount", "number");
        assert_form_input(&form, "advance_paid", "number");
        assert_form_input_with_value(&form, "date", "date", "2025-03-10");
    }

    #[test]
    fn category_select_lists_every_category() {
        let html = render(&RawExpenseInput::default(), &[], false);
        let form = must_get_form(&html);

        assert_eq!(
            get_select_options(&form, "category"),
            vec![
                "",
                "accommodation",
                "food",
                "transport",
                "activities",
                "shopping",
                "miscellaneous"
            ]
        );
    }

    #[test]
    fn owner_field_only_for_admins() {
        let member_html = render(&RawExpenseInput::default(), &[], false);
        let admin_html = render(&RawExpenseInput::default(), &[], true);

        assert!(
            member_html
                .select(&scraper::Selector::parse("input[name=user_name]").unwrap())
                .next()
                .is_none()
        );
        assert_form_input(&must_get_form(&admin_html), "user_name", "text");
    }

    #[test]
    fn renders_errors_next_to_fields() {
        let input = RawExpenseInput {
            total_amount: "1000".to_owned(),
            advance_paid: "1200".to_owned(),
            ..Default::default()
        };
        let errors = [FieldError {
            field: "advance_paid",
            message: "Advance cannot be more than total amount.".to_owned(),
        }];

        let html = render(&input, &errors, false);

        assert_field_error(&html, "advance_paid", "Advance cannot be more than total amount.");
        assert_no_field_error(&html, "total_amount");
        assert_form_input_with_value(&must_get_form(&html), "advance_paid", "number", "1200");
    }
}
