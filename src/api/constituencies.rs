use crate::error::Result;
use crate::model::constituency::Constituency;
use crate::Backend;

use super::{payload::exact_fields, reply::NOT_FOUND, Reply};

/// `getConstituency;cityCode`
pub(super) async fn get_constituency(backend: &Backend, payload: &str) -> Result<Reply> {
    let city_code = payload.trim().to_string();
    let constituency = backend
        .store()
        .run(move |conn| Constituency::by_code(conn, &city_code))
        .await?;
    Ok(constituency.map_or_else(|| Reply::new(NOT_FOUND), |c| Reply::new(c.record())))
}

/// `addConstituency;cityCode,province,division,district,city,seatNA,seatPP`
pub(super) async fn add_constituency(backend: &Backend, payload: &str) -> Result<Reply> {
    let [city_code, province, division, district, city, seat_na, seat_pp] = exact_fields(payload)?;
    let constituency = Constituency {
        city_code: city_code.to_string(),
        province: province.to_string(),
        division: division.to_string(),
        district: district.to_string(),
        city: city.to_string(),
        seat_na: seat_na.to_ascii_uppercase(),
        seat_pp: seat_pp.to_ascii_uppercase(),
    };
    backend
        .store()
        .run(move |conn| constituency.insert(conn))
        .await?;
    Ok(Reply::new("SUCCESS"))
}
