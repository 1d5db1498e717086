use super::{PageContext, escape, layout};
use crate::qualifications::ListViewModel;

pub fn index(ctx: &PageContext, model: &ListViewModel) -> String {
    let mut items = String::new();
    let mut options = String::new();

    for qualification in &model.qualifications {
        let selected = model.is_selected(qualification);
        items.push_str(&format!(
            "      <li data-qualification-id=\"{}\"{}>{}</li>\n",
            qualification.id,
            if selected { " class=\"selected\"" } else { "" },
            escape(qualification.name),
        ));
        options.push_str(&format!(
            "        <option value=\"{}\"{}>{}</option>\n",
            qualification.id,
            if selected { " selected" } else { "" },
            escape(qualification.name),
        ));
    }

    let selected_name = model
        .selected_qualification()
        .map(|qualification| escape(qualification.name))
        .unwrap_or_default();

    let body = format!(
        r#"    <h1>Qualifications</h1>
    <ul class="qualifications">
{items}    </ul>
    <label for="qualification">Selected</label>
    <select id="qualification" name="qualification">
{options}    </select>
    <p>Selected qualification: <strong>{selected_name}</strong></p>
"#
    );

    layout(ctx, "Qualifications", &body)
}
