//! Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet.

use crate::api::{Sheet, SheetRange, TokenProvider};
use crate::{Config, Result};
use anyhow::{ensure, Context};
use sheets::types::{
    BatchClearValuesRequest, BatchUpdateValuesRequest, DateTimeRenderOption, Dimension,
    Spreadsheet, ValueInputOption, ValueRange, ValueRenderOption,
};
use sheets::ClientError;
use tracing::trace;

/// Implements the `Sheet` trait with the `sheets::Client`. The `TokenProvider` is asked for a
/// fresh token before every call.
pub(super) struct GoogleSheet {
    config: Config,
    token_provider: TokenProvider,
    client: sheets::Client,
}

impl GoogleSheet {
    pub(super) async fn new(config: Config, mut token_provider: TokenProvider) -> Result<Self> {
        let client = create_sheets_client(&mut token_provider).await?;
        Ok(Self {
            config,
            token_provider,
            client,
        })
    }

    async fn refresh_client(&mut self) -> Result<()> {
        self.client = create_sheets_client(&mut self.token_provider).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>> {
        trace!("get for {sheet_name}");
        self.refresh_client().await?;
        let range = format!("{sheet_name}!A:ZZ");
        let response = self
            .client
            .spreadsheets()
            .values_get(
                self.config.spreadsheet_id(),
                &range,
                DateTimeRenderOption::FormattedString,
                Dimension::Rows,
                ValueRenderOption::FormattedValue,
            )
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to fetch {sheet_name} sheet data"))?;
        Ok(response.body.values)
    }

    async fn clear_ranges(&mut self, ranges: &[&str]) -> Result<()> {
        trace!("clear_ranges for {ranges:?}");
        self.refresh_client().await?;
        let request = BatchClearValuesRequest {
            ranges: ranges.iter().map(|s| s.to_string()).collect(),
        };
        self.client
            .spreadsheets()
            .values_batch_clear(self.config.spreadsheet_id(), &request)
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to clear ranges: {ranges:?}"))?;
        Ok(())
    }

    async fn write_ranges(&mut self, data: &[SheetRange]) -> Result<()> {
        self.refresh_client().await?;
        let value_ranges: Vec<ValueRange> = data
            .iter()
            .map(|sr| ValueRange {
                major_dimension: Some(Dimension::Rows),
                range: sr.range.clone(),
                values: sr.values.clone(),
            })
            .collect();

        let request = BatchUpdateValuesRequest {
            data: value_ranges,
            include_values_in_response: Some(false),
            response_date_time_render_option: None,
            response_value_render_option: None,
            value_input_option: Some(ValueInputOption::Raw),
        };

        self.client
            .spreadsheets()
            .values_batch_update(self.config.spreadsheet_id(), &request)
            .await
            .map_err(map_client_error)
            .context("Failed to write ranges")?;
        Ok(())
    }
}

/// Creates a spreadsheet titled `title` whose only tab is named `tab`, returning its URL.
pub(super) async fn create_spreadsheet(
    mut token_provider: TokenProvider,
    title: &str,
    tab: &str,
) -> Result<String> {
    let client = create_sheets_client(&mut token_provider).await?;
    let body: Spreadsheet = serde_json::from_value(serde_json::json!({
        "properties": { "title": title },
        "sheets": [{ "properties": { "title": tab } }],
    }))
    .context("Unable to build the create spreadsheet request")?;
    let created = client
        .spreadsheets()
        .create(&body)
        .await
        .map_err(map_client_error)
        .context("Failed to create a spreadsheet")?
        .body;
    ensure!(
        !created.spreadsheet_id.is_empty(),
        "Google did not return an id for the new spreadsheet"
    );
    if created.spreadsheet_url.is_empty() {
        return Ok(format!(
            "https://docs.google.com/spreadsheets/d/{}/edit",
            created.spreadsheet_id
        ));
    }
    Ok(created.spreadsheet_url)
}

async fn create_sheets_client(token_provider: &mut TokenProvider) -> Result<sheets::Client> {
    let access_token = token_provider.token_with_refresh().await?;

    // The client only needs the access token, we handle refreshing ourselves.
    Ok(sheets::Client::new(
        String::new(),
        String::new(),
        String::new(),
        access_token.to_string(),
        String::new(),
    ))
}

fn map_client_error(e: ClientError) -> anyhow::Error {
    let error_name = match &e {
        ClientError::EmptyRefreshToken => "EmptyRefreshToken".to_string(),
        ClientError::FromUtf8Error(inner) => format!("FromUtf8Error {inner}"),
        ClientError::UrlParserError(inner) => format!("UrlParserError {inner}"),
        ClientError::SerdeJsonError(inner) => format!("SerdeJsonError {inner}"),
        ClientError::ReqwestError(inner) => format!("ReqwestError {inner}"),
        ClientError::InvalidHeaderValue(inner) => format!("InvalidHeaderValue {inner}"),
        ClientError::ReqwestMiddleWareError(inner) => format!("ReqwestMiddleWareError {inner}"),
        ClientError::HttpError { .. } => "HttpError".to_string(),
        ClientError::Other(_) => "Other".to_string(),
    };
    anyhow::Error::new(e).context(error_name)
}
