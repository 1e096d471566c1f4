use crate::error::{Error, Result};
use crate::model::user::{Role, User};
use crate::Backend;

use super::{
    payload::{exact_fields, fields},
    reply::{DUPLICATE, INVALID, NOT_FOUND, NO_MATCH},
    Reply,
};

/// `checkCNIC;cnic`: is this CNIC still free to sign up?
pub(super) async fn check_cnic(backend: &Backend, payload: &str) -> Result<Reply> {
    let exists = user_exists(backend, payload).await?;
    Ok(Reply::new(if exists { DUPLICATE } else { "OK" }))
}

/// `verifyCNIC;cnic`: does this CNIC belong to a user?
pub(super) async fn verify_cnic(backend: &Backend, payload: &str) -> Result<Reply> {
    let exists = user_exists(backend, payload).await?;
    Ok(Reply::new(if exists { "OK" } else { NOT_FOUND }))
}

async fn user_exists(backend: &Backend, cnic: &str) -> Result<bool> {
    let cnic = cnic.trim().to_string();
    backend
        .store()
        .run(move |conn| User::exists(conn, &cnic))
        .await
}

/// `signupUser;name,cnic,phone,passwordHash,province,division,district,city,seatNA,seatPP,gender`
pub(super) async fn signup_user(backend: &Backend, payload: &str) -> Result<Reply> {
    let [name, cnic, phone, password_hash, province, division, district, city, seat_na, seat_pp, gender] =
        exact_fields(payload)?;
    let user = User {
        cnic: cnic.to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        password_hash: password_hash.to_string(),
        province: province.to_string(),
        division: division.to_string(),
        district: district.to_string(),
        city: city.to_string(),
        seat_na: seat_na.to_string(),
        seat_pp: seat_pp.to_string(),
        gender: gender.to_string(),
        role: Role::Voter,
    }
    .validate()?;
    let cnic = user.cnic.clone();
    backend.store().run(move |conn| user.insert(conn)).await?;
    info!("Signed up voter {cnic}");
    Ok(Reply::new("SUCCESS"))
}

/// `login;cnic,passwordHash`: the user's role, or `INVALID`.
pub(super) async fn login(backend: &Backend, payload: &str) -> Result<Reply> {
    let [cnic, password_hash] = fields(payload)?;
    let (cnic, password_hash) = (cnic.to_string(), password_hash.to_string());
    let role = backend
        .store()
        .run(move |conn| User::login(conn, &cnic, &password_hash))
        .await?;
    Ok(Reply::new(role.map_or(INVALID, Role::as_str)))
}

/// `updatePassword;cnic,passwordHash`
pub(super) async fn update_password(backend: &Backend, payload: &str) -> Result<Reply> {
    let [cnic, password_hash] = fields(payload)?;
    let (cnic, password_hash) = (cnic.to_string(), password_hash.to_string());
    let updated = backend
        .store()
        .run(move |conn| User::update_password(conn, &cnic, &password_hash))
        .await?;
    if updated {
        Ok(Reply::new("SUCCESS"))
    } else {
        Err(Error::rejected("update failed"))
    }
}

/// `getUserName;cnic`
pub(super) async fn get_user_name(backend: &Backend, payload: &str) -> Result<Reply> {
    let cnic = payload.trim().to_string();
    let user = backend
        .store()
        .run(move |conn| User::by_cnic(conn, &cnic))
        .await?;
    user.map(|user| Reply::new(user.name))
        .ok_or_else(|| Error::rejected("CNIC not found"))
}

/// `getAllVoters`
pub(super) async fn get_all_voters(backend: &Backend) -> Result<Reply> {
    let voters = backend.store().run(|conn| User::voters(conn)).await?;
    Ok(Reply::records(voters.iter().map(User::record)))
}

/// `searchVoterByCnic;cnic`
pub(super) async fn search_voter_by_cnic(backend: &Backend, payload: &str) -> Result<Reply> {
    let cnic = payload.trim().to_string();
    let voter = backend
        .store()
        .run(move |conn| User::voter_by_cnic(conn, &cnic))
        .await?;
    Ok(voter.map_or_else(|| Reply::new(NO_MATCH), |voter| Reply::new(voter.detail_record())))
}

/// `getVotersNumber`
pub(super) async fn get_voters_number(backend: &Backend) -> Result<Reply> {
    let count = backend.store().run(|conn| User::voter_count(conn)).await?;
    Ok(Reply::new(count.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::client::Client;
    use crate::model::examples::{ADMIN_CNIC, PASSWORD_HASH, VOTER_CNIC, VOTER_NAME};

    use super::*;

    const SIGNUP: &str =
        "Bilal Ahmed,3520287654321,0321 7654321,abc123,Punjab,Lahore,Lahore,Lahore,NA-1,PP-1,Male";

    #[backend_test(seeded)]
    async fn cnic_checks(client: Client) {
        assert_eq!(client.send("checkCNIC", VOTER_CNIC).await.unwrap(), DUPLICATE);
        assert_eq!(client.send("checkCNIC", "3520200000000").await.unwrap(), "OK");
        assert_eq!(client.send("verifyCNIC", VOTER_CNIC).await.unwrap(), "OK");
        assert_eq!(client.send("verifyCNIC", "3520200000000").await.unwrap(), NOT_FOUND);
    }

    #[backend_test(seeded)]
    async fn signup(client: Client) {
        assert_eq!(client.send("signupUser", SIGNUP).await.unwrap(), "SUCCESS");
        assert_eq!(
            client.send("signupUser", SIGNUP).await.unwrap(),
            "ERROR:CNIC already registered"
        );
        assert_eq!(
            client.send("signupUser", "Bilal,3520287654321").await.unwrap(),
            "ERROR:bad field count"
        );
        assert_eq!(
            client
                .send("signupUser", &SIGNUP.replace("3520287654321", "35202-876543"))
                .await
                .unwrap(),
            "ERROR:CNIC must be 13 digits"
        );
        assert!(client
            .send("signupUser", &SIGNUP.replace("0321 7654321", "12"))
            .await
            .unwrap()
            .starts_with("ERROR:"));

        assert_eq!(client.send("getUserName", "3520287654321").await.unwrap(), "Bilal Ahmed");
        assert_eq!(client.send("getVotersNumber", "").await.unwrap(), "2");
        assert_eq!(
            client.send("searchVoterByCnic", "3520287654321").await.unwrap(),
            "3520287654321,Bilal Ahmed,+923217654321,Lahore,Voter,NA-1,PP-1"
        );
    }

    #[backend_test(seeded)]
    async fn login_and_password(client: Client) {
        let login = format!("{VOTER_CNIC},{PASSWORD_HASH}");
        assert_eq!(client.send("login", &login).await.unwrap(), "Voter");
        assert_eq!(
            client
                .send("login", &format!("{ADMIN_CNIC},{PASSWORD_HASH}"))
                .await
                .unwrap(),
            "Admin"
        );
        assert_eq!(client.send("login", &format!("{VOTER_CNIC},wrong")).await.unwrap(), INVALID);
        assert_eq!(client.send("login", VOTER_CNIC).await.unwrap(), "ERROR:bad format");

        assert_eq!(
            client
                .send("updatePassword", &format!("{VOTER_CNIC},newhash"))
                .await
                .unwrap(),
            "SUCCESS"
        );
        assert_eq!(client.send("login", &login).await.unwrap(), INVALID);
        assert_eq!(
            client.send("updatePassword", "3520200000000,newhash").await.unwrap(),
            "ERROR:update failed"
        );
    }

    #[backend_test(seeded)]
    async fn voter_listings(client: Client) {
        assert_eq!(client.send("getUserName", VOTER_CNIC).await.unwrap(), VOTER_NAME);
        assert_eq!(
            client.send("getUserName", "3520200000000").await.unwrap(),
            "ERROR:CNIC not found"
        );

        let all = client.send("getAllVoters", "").await.unwrap();
        assert_eq!(all, format!("{VOTER_CNIC},{VOTER_NAME},+923001234567,Lahore,Voter"));
        assert!(!all.contains(ADMIN_CNIC));

        assert_eq!(client.send("searchVoterByCnic", ADMIN_CNIC).await.unwrap(), NO_MATCH);
        assert_eq!(client.send("getVotersNumber", "").await.unwrap(), "1");
    }
}
