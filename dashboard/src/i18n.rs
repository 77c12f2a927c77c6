use parkcore::detection::ObjectClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ko,
    En,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::Ko => Language::En,
            Language::En => Language::Ko,
        }
    }

    /// Code shown on the toggle button: the language you switch to.
    pub fn toggle_code(self) -> &'static str {
        match self {
            Language::Ko => "EN",
            Language::En => "KO",
        }
    }
}

/// Semantic UI text keys, resolved explicitly instead of scanning live
/// element identifiers.
#[derive(Debug, Clone, Copy)]
pub enum UiText {
    LogoTitle,
    LogoSubtitle,
    UploadTitle,
    UploadHint,
    ChooseFile,
    ScanButton,
    CancelButton,
    LoadingTitle,
    LoadingHint,
    ResultTitle,
    DetectedStat,
    FileStat,
    NewAnalysis,
    HeatmapButton,
    HistoryTitle,
    HistoryEmpty,
    RefreshHistory,
    DeleteButton,
    MissingDetailNotice,
    OriginalPending,
    Class(ObjectClass),
}

pub fn text(language: Language, key: UiText) -> &'static str {
    match language {
        Language::Ko => match key {
            UiText::LogoTitle => "AI 드론 비전",
            UiText::LogoSubtitle => "스마트 주차장 모니터링",
            UiText::UploadTitle => "드론 이미지 업로드",
            UiText::UploadHint => "이미지를 선택하여 스캔",
            UiText::ChooseFile => "이미지 선택",
            UiText::ScanButton => "스캔 시작",
            UiText::CancelButton => "취소",
            UiText::LoadingTitle => "객체 분석 중...",
            UiText::LoadingHint => "분석 서버 응답 대기",
            UiText::ResultTitle => "분석 보고서",
            UiText::DetectedStat => "감지된 차량",
            UiText::FileStat => "파일명",
            UiText::NewAnalysis => "새 분석",
            UiText::HeatmapButton => "히트맵",
            UiText::HistoryTitle => "스캔 로그",
            UiText::HistoryEmpty => "로그 없음",
            UiText::RefreshHistory => "새로고침",
            UiText::DeleteButton => "삭제",
            UiText::MissingDetailNotice => "히트맵을 생성할 상세 데이터가 없습니다.",
            UiText::OriginalPending => "원본 이미지를 아직 불러오는 중입니다.",
            UiText::Class(class) => class_label_ko(class),
        },
        Language::En => match key {
            UiText::LogoTitle => "AI DRONE VISION",
            UiText::LogoSubtitle => "SMART PARKING MONITOR",
            UiText::UploadTitle => "DRONE IMAGERY UPLOAD",
            UiText::UploadHint => "Pick an image to scan",
            UiText::ChooseFile => "CHOOSE IMAGE",
            UiText::ScanButton => "SCAN START",
            UiText::CancelButton => "CANCEL",
            UiText::LoadingTitle => "ANALYZING OBJECTS...",
            UiText::LoadingHint => "Waiting for the analysis backend",
            UiText::ResultTitle => "ANALYSIS REPORT",
            UiText::DetectedStat => "DETECTED VEHICLES",
            UiText::FileStat => "FILE NAME",
            UiText::NewAnalysis => "NEW SCAN",
            UiText::HeatmapButton => "HEATMAP",
            UiText::HistoryTitle => "SCAN LOGS",
            UiText::HistoryEmpty => "No Logs",
            UiText::RefreshHistory => "REFRESH",
            UiText::DeleteButton => "DELETE",
            UiText::MissingDetailNotice => "No detail data available for the heatmap.",
            UiText::OriginalPending => "Original image is still loading.",
            UiText::Class(class) => class_label_en(class),
        },
    }
}

fn class_label_ko(class: ObjectClass) -> &'static str {
    match class {
        ObjectClass::Car => "승용차",
        ObjectClass::Bus => "버스",
        ObjectClass::Truck => "트럭",
        ObjectClass::Motorcycle => "이륜차",
        ObjectClass::Person => "보행자",
        ObjectClass::Other => "기타",
    }
}

fn class_label_en(class: ObjectClass) -> &'static str {
    match class {
        ObjectClass::Car => "CAR",
        ObjectClass::Bus => "BUS",
        ObjectClass::Truck => "TRUCK",
        ObjectClass::Motorcycle => "BIKE",
        ObjectClass::Person => "PERSON",
        ObjectClass::Other => "OTHER",
    }
}
