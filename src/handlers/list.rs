use axum::response::Html;

use crate::{
    error::AppResult, extract::CurrentSession, qualifications::ListViewModel, views,
};

pub async fn index(CurrentSession(session): CurrentSession) -> AppResult<Html<String>> {
    let model = ListViewModel::current();
    Ok(Html(views::list::index(
        &views::PageContext::load(&session).await?,
        &model,
    )))
}
