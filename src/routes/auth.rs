use crate::error::ApiError;
use crate::models::{
    Company, CompanySignupRequest, CurrentUserResponse, LoginForm, MessageResponse, Professional,
    ProfessionalSignupRequest, SignupRequest, Student, StudentSignupRequest, TokenResponse,
    UserRecord, UserType, ValidatedSkillSet,
};
use crate::routes::{AppState, CurrentUser};
use actix_web::{web, HttpResponse};
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/signup", web::post().to(signup))
        .route("/signup/student", web::post().to(signup_student))
        .route("/signup/professional", web::post().to(signup_professional))
        .route("/signup/company", web::post().to(signup_company))
        .route("/login", web::post().to(login))
        .route("/me", web::get().to(me));
}

/// Plain account creation
///
/// POST /auth/signup
async fn signup(
    state: web::Data<AppState>,
    req: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let session = state.identity.sign_up(&req.email, &req.password).await?;
    let now = chrono::Utc::now();

    let record = UserRecord {
        email: req.email.clone(),
        created_at: Some(now.to_rfc3339()),
        ..Default::default()
    };
    state.db.put_user(&session.local_id, &record).await?;

    tracing::info!("Created account {}", session.local_id);

    Ok(HttpResponse::Created().json(MessageResponse::for_user(
        format!("User account created successfully for user {}", session.local_id),
        session.local_id,
    )))
}

/// POST /auth/signup/student
async fn signup_student(
    state: web::Data<AppState>,
    req: web::Json<StudentSignupRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let req = req.into_inner();

    let session = state
        .identity
        .sign_up(&req.profile.email, &req.password)
        .await?;
    let uid = session.local_id;

    let student = Student {
        id: uid.clone(),
        profile: req.profile,
        competences: Vec::new(),
        validated_skills: ValidatedSkillSet::new(),
        user_type: UserType::Student,
        profile_complete: false,
        created_at: Some(chrono::Utc::now()),
    };
    state.db.put_student(&student).await?;

    let record = UserRecord {
        email: student.profile.email.clone(),
        user_type: Some(UserType::Student),
        profile_complete: Some(false),
        ..Default::default()
    };
    state.db.put_user(&uid, &record).await?;

    tracing::info!("Created student account {}", uid);

    Ok(HttpResponse::Created().json(MessageResponse::for_user(
        "Student account created successfully",
        uid,
    )))
}

/// POST /auth/signup/professional
async fn signup_professional(
    state: web::Data<AppState>,
    req: web::Json<ProfessionalSignupRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let req = req.into_inner();

    let session = state
        .identity
        .sign_up(&req.profile.email, &req.password)
        .await?;
    let uid = session.local_id;

    let professional = Professional {
        id: uid.clone(),
        profile: req.profile,
        validation_count: 0,
        rating: 0.0,
        user_type: UserType::Professional,
        verified: false,
        created_at: Some(chrono::Utc::now()),
    };
    state.db.put_professional(&professional).await?;

    let record = UserRecord {
        email: professional.profile.email.clone(),
        user_type: Some(UserType::Professional),
        verified: Some(false),
        ..Default::default()
    };
    state.db.put_user(&uid, &record).await?;

    tracing::info!("Created professional account {}", uid);

    Ok(HttpResponse::Created().json(MessageResponse::for_user(
        "Professional account created successfully",
        uid,
    )))
}

/// POST /auth/signup/company
async fn signup_company(
    state: web::Data<AppState>,
    req: web::Json<CompanySignupRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let req = req.into_inner();

    let session = state.identity.sign_up(&req.email, &req.password).await?;
    let uid = session.local_id;

    let company = Company {
        id: uid.clone(),
        profile: req.profile,
        email: req.email,
        contact_person: req.contact_person,
        contact_position: req.contact_position,
        active_offers: 0,
        user_type: UserType::Company,
        verified: false,
        created_at: Some(chrono::Utc::now()),
    };
    state.db.put_company(&company).await?;

    let record = UserRecord {
        email: company.email.clone(),
        user_type: Some(UserType::Company),
        verified: Some(false),
        ..Default::default()
    };
    state.db.put_user(&uid, &record).await?;

    tracing::info!("Created company account {}", uid);

    Ok(HttpResponse::Created().json(MessageResponse::for_user(
        "Company account created successfully",
        uid,
    )))
}

/// Exchange credentials for an ID token
///
/// POST /auth/login (form: username, password)
async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, ApiError> {
    let session = state
        .identity
        .sign_in(&form.username, &form.password)
        .await
        .map_err(|e| {
            tracing::info!("Login failed for {}: {}", form.username, e);
            ApiError::Unauthorized("Invalid credentials".to_string())
        })?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token: session.id_token,
        token_type: "bearer".to_string(),
    }))
}

/// GET /auth/me
async fn me(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(CurrentUserResponse {
        uid: user.uid,
        email: user.record.email,
        user_type: user.record.user_type,
        profile_complete: user.record.profile_complete,
        verified: user.record.verified,
    })
}
